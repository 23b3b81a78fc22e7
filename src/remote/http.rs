//! HTTP implementation of the remote mirror.
//!
//! Speaks the plain REST dialect of hosted realtime key-value databases:
//! `GET <base>/<path>.json` returns the stored JSON (or `null` for an
//! absent key) and `PUT <base>/<path>.json` replaces it wholesale.

use std::time::Duration;

use anyhow::Result;
use futures::future::BoxFuture;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::{RemoteConfig, RemoteError, RemoteStore};

/// HTTP request timeout in seconds.
/// Mirror writes are fire-and-forget, so a stuck request only delays its
/// own completion; 15s keeps the log noise timely.
const REQUEST_TIMEOUT_SECS: u64 = 15;

/// Remote mirror client.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpRemoteStore {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpRemoteStore {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
        })
    }

    fn url_for(&self, path: &str) -> String {
        match &self.auth_token {
            Some(token) => format!("{}/{}.json?auth={}", self.base_url, path, token),
            None => format!("{}/{}.json", self.base_url, path),
        }
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(RemoteError::from_status(status, &body))
        }
    }

    async fn get_value(&self, path: &str) -> Result<Option<Value>, RemoteError> {
        debug!(path, "remote get");
        let response = self.client.get(self.url_for(path)).send().await?;
        let response = Self::check_response(response).await?;
        let value: Value = response.json().await?;

        // An absent key comes back as a JSON `null` body with status 200.
        if value.is_null() {
            Ok(None)
        } else {
            Ok(Some(value))
        }
    }

    async fn put_value(&self, path: &str, value: &Value) -> Result<(), RemoteError> {
        debug!(path, "remote put");
        let response = self.client.put(self.url_for(path)).json(value).send().await?;
        Self::check_response(response).await?;
        Ok(())
    }
}

impl RemoteStore for HttpRemoteStore {
    fn get<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<Option<Value>, RemoteError>> {
        Box::pin(self.get_value(path))
    }

    fn put<'a>(&'a self, path: &'a str, value: Value) -> BoxFuture<'a, Result<(), RemoteError>> {
        Box::pin(async move { self.put_value(path, &value).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(base: &str, token: Option<&str>) -> HttpRemoteStore {
        HttpRemoteStore::new(&RemoteConfig {
            base_url: base.to_string(),
            auth_token: token.map(String::from),
        })
        .expect("client should build")
    }

    #[test]
    fn test_url_for_without_token() {
        let remote = store("https://example.test/db/", None);
        assert_eq!(
            remote.url_for("users/alice/tasks"),
            "https://example.test/db/users/alice/tasks.json"
        );
    }

    #[test]
    fn test_url_for_with_token() {
        let remote = store("https://example.test/db", Some("s3cret"));
        assert_eq!(
            remote.url_for("users/alice/metadata"),
            "https://example.test/db/users/alice/metadata.json?auth=s3cret"
        );
    }
}
