//! Remote key-value mirror for cross-device sync.
//!
//! The mirror is strictly best-effort: it is configured (or not) once at
//! startup, loads prefer it when it answers, and saves replicate to it
//! without ever blocking or failing the caller.

pub mod config;
pub mod error;
pub mod http;
pub mod store;

pub use config::RemoteConfig;
pub use error::RemoteError;
pub use http::HttpRemoteStore;
pub use store::RemoteStore;
