// afire-api: Async Rust client for the AFIRE fireplace cloud (Gizwits platform)

pub mod auth;
pub mod client;
pub mod clock;
pub mod devices;
pub mod error;
pub mod models;
pub mod session;
pub mod transport;

pub use client::CloudClient;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, ErrorKind};
pub use models::{Attributes, DeviceBinding};
pub use session::{Credentials, SESSION_SKEW, Session, SessionManager};
pub use transport::TransportConfig;

/// Production endpoint of the vendor cloud.
pub const DEFAULT_BASE_URL: &str = "https://api.gizwits.com/app";

/// Application identifier shared by every installation of the AFIRE mobile app.
pub const DEFAULT_APP_ID: &str = "8dd16cd21b2d44a895c55897856496d5";
