use futures::future::BoxFuture;
use serde_json::Value;

use super::RemoteError;

/// The remote key-value mirror capability.
///
/// Paths are rooted at the normalized user identifier
/// (`users/<user>/tasks`, `users/<user>/metadata`). The trait exists so
/// the store can be exercised against fakes; production code uses
/// `HttpRemoteStore`.
pub trait RemoteStore: Send + Sync {
    /// Fetch the value at `path`. `None` means nothing was ever written there.
    fn get<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<Option<Value>, RemoteError>>;

    /// Overwrite the value at `path` with the given value.
    fn put<'a>(&'a self, path: &'a str, value: Value) -> BoxFuture<'a, Result<(), RemoteError>>;
}
