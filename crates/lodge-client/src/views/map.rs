//! Marker map.

use lodge_shared::constants::{DEFAULT_MAP_CENTER, DEFAULT_MAP_ZOOM};
use lodge_shared::types::{Capability, Marker, MarkerCategory, MarkerId, NewMarker};
use tracing::{debug, error};

use crate::api::Outcome;
use crate::error::{ClientError, Result};
use crate::state::AppState;
use crate::views::describe_failure;

const CREATED: &str = "You added a new marker!";
const CREATE_FORBIDDEN: &str = "You don't have permission to create a marker.";
const DELETE_FORBIDDEN: &str = "You don't have permission to delete this marker.";

/// A marker ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct Pin {
    pub id: Option<MarkerId>,
    pub lat: f64,
    pub lng: f64,
    pub category: MarkerCategory,
    pub icon: &'static str,
    pub popup: String,
}

impl From<&Marker> for Pin {
    fn from(marker: &Marker) -> Self {
        Self {
            id: marker.id,
            lat: marker.lat,
            lng: marker.lng,
            category: marker.name,
            icon: marker.name.icon(),
            popup: format!("Lat: {:.4}, Lng: {:.4}", marker.lat, marker.lng),
        }
    }
}

#[derive(Debug)]
pub struct MapView {
    pub markers: Vec<Marker>,
    pub center: (f64, f64),
    pub zoom: u8,
    pub loading: bool,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            markers: Vec::new(),
            center: DEFAULT_MAP_CENTER,
            zoom: DEFAULT_MAP_ZOOM,
            loading: false,
        }
    }
}

impl MapView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pins(&self) -> Vec<Pin> {
        self.markers.iter().map(Pin::from).collect()
    }

    /// Replace the list with the server's. A failed fetch keeps what we had.
    pub async fn load_markers(&mut self, state: &AppState) -> Result<()> {
        self.loading = true;
        let result = state.api.get_json::<Vec<Marker>>("markers/").await;
        self.loading = false;

        match result {
            Ok(Outcome::Done(markers)) => {
                debug!(count = markers.len(), "markers loaded");
                self.markers = markers;
            }
            Ok(Outcome::Redirecting(_)) => {}
            Err(e) => {
                error!(error = %e, "Error fetching markers");
                state
                    .notifier
                    .error(describe_failure("Error fetching markers", &e));
            }
        }
        Ok(())
    }

    /// Create a marker and append the server echo. Returns whether the list grew.
    pub async fn create_marker(
        &mut self,
        state: &AppState,
        lat: f64,
        lng: f64,
        category: MarkerCategory,
    ) -> Result<bool> {
        let body = NewMarker {
            lat,
            lng,
            name: category,
        };
        match state.api.post_json::<_, Marker>("markers/", &body).await {
            Ok(Outcome::Done(marker)) => {
                self.markers.push(marker);
                self.center = (lat, lng);
                state.notifier.success(CREATED);
                Ok(true)
            }
            Ok(Outcome::Redirecting(_)) => Ok(false),
            Err(e) if e.is_forbidden() => {
                state.notifier.error(CREATE_FORBIDDEN);
                Ok(false)
            }
            Err(e) => {
                error!(error = %e, "Error creating marker");
                state
                    .notifier
                    .error(describe_failure("Error creating marker", &e));
                Ok(false)
            }
        }
    }

    pub fn can_delete(state: &AppState) -> bool {
        state
            .session_user()
            .ok()
            .and_then(|u| u.user().map(|u| u.can(Capability::DeleteMarker)))
            .unwrap_or(false)
    }

    /// Delete a marker; only ranks holding the delete capability may try.
    pub async fn delete_marker(&mut self, state: &AppState, id: MarkerId) -> Result<bool> {
        if !Self::can_delete(state) {
            return Err(ClientError::NotPermitted(Capability::DeleteMarker));
        }

        match state.api.delete(&format!("markers/{id}/")).await {
            Ok(Outcome::Done(())) => {
                self.markers.retain(|m| m.id != Some(id));
                Ok(true)
            }
            Ok(Outcome::Redirecting(_)) => Ok(false),
            Err(e) if e.is_forbidden() => {
                state.notifier.error(DELETE_FORBIDDEN);
                Ok(false)
            }
            Err(e) => {
                error!(error = %e, marker = id, "Error deleting marker");
                state
                    .notifier
                    .error(describe_failure("Error deleting marker", &e));
                Ok(false)
            }
        }
    }
}
