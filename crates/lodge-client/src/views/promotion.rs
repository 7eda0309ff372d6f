//! Rank promotion eligibility.

use chrono::{DateTime, Duration, Utc};
use lodge_shared::constants::{GOLDEN_TENURE_DAYS, PROMOTION_COOLDOWN_DAYS};
use lodge_shared::types::{Rank, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromotionStatus {
    /// Already at the top rank.
    Top,
    /// A promotion was attempted less than the cooldown ago.
    Cooldown { until: DateTime<Utc> },
    /// GOLDEN held for less than the required tenure. `until` is unknown
    /// when the backend did not report when the rank was assigned.
    AwaitingTenure { until: Option<DateTime<Utc>> },
    Eligible { next: Rank },
}

impl PromotionStatus {
    pub fn evaluate(user: &User, now: DateTime<Utc>) -> Self {
        let Some(next) = user.role.next() else {
            return PromotionStatus::Top;
        };

        if let Some(last) = user.last_promotion_attempt {
            let until = last + Duration::days(PROMOTION_COOLDOWN_DAYS);
            if now < until {
                return PromotionStatus::Cooldown { until };
            }
        }

        if user.role == Rank::Golden {
            let until = user
                .role_assigned_at
                .map(|assigned| assigned + Duration::days(GOLDEN_TENURE_DAYS));
            match until {
                Some(until) if now >= until => {}
                _ => return PromotionStatus::AwaitingTenure { until },
            }
        }

        PromotionStatus::Eligible { next }
    }

    pub fn can_request(&self) -> bool {
        matches!(self, PromotionStatus::Eligible { .. })
    }

    pub fn message(&self) -> String {
        match self {
            PromotionStatus::Top => "Your role cannot be promoted.".into(),
            PromotionStatus::Cooldown { until } => format!(
                "You can attempt promotion again after {}.",
                until.format("%Y-%m-%d")
            ),
            PromotionStatus::AwaitingTenure { .. } => {
                "You must be Golden for 42 days before requesting promotion to Architect.".into()
            }
            PromotionStatus::Eligible { next: Rank::Architect } => {
                "You are eligible to request promotion to Architect.".into()
            }
            PromotionStatus::Eligible { .. } => "You are eligible to request promotion.".into(),
        }
    }

    /// "Promote to Silver"; `None` when there is no button to show.
    pub fn button_label(&self) -> Option<String> {
        match self {
            PromotionStatus::Eligible { next } => Some(format!("Promote to {}", next.label())),
            _ => None,
        }
    }
}
