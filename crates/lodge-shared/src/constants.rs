/// Application name
pub const APP_NAME: &str = "Lodge";

/// Default REST backend base URL
pub const DEFAULT_API_URL: &str = "http://localhost:8000/";

/// Scheme used in the `Authorization` header
pub const AUTH_SCHEME: &str = "Token";

/// Persisted storage key: entry password gate flag
pub const KEY_ENTRY_VERIFIED: &str = "entryPasswordVerified";

/// Persisted storage key: auth token
pub const KEY_AUTH_TOKEN: &str = "authToken";

/// Persisted storage key: serialized session user
pub const KEY_USER: &str = "user";

/// The only stored flag value that grants entry
pub const ENTRY_VERIFIED_VALUE: &str = "true";

/// Minimum password length accepted by the auth forms
pub const MIN_PASSWORD_LEN: usize = 8;

/// Days between two promotion attempts
pub const PROMOTION_COOLDOWN_DAYS: i64 = 42;

/// Days a GOLDEN member must hold the rank before requesting ARCHITECT
pub const GOLDEN_TENURE_DAYS: i64 = 42;

/// Countdown tick period in milliseconds
pub const COUNTDOWN_TICK_MS: u64 = 1000;

/// Default map centre (lat, lng)
pub const DEFAULT_MAP_CENTER: (f64, f64) = (48.919, 24.71);

/// Default map zoom level
pub const DEFAULT_MAP_ZOOM: u8 = 13;
