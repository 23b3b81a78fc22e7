/// Environment variable naming the remote mirror's base URL.
const SYNC_URL_VAR: &str = "CHRONOS_SYNC_URL";

/// Environment variable holding the optional database auth token.
const SYNC_TOKEN_VAR: &str = "CHRONOS_SYNC_TOKEN";

/// Remote mirror configuration, read once at startup.
///
/// An absent URL selects local-only operation; that is a supported mode,
/// not an error, and it is never re-evaluated while the process runs.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub base_url: String,
    pub auth_token: Option<String>,
}

impl RemoteConfig {
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var(SYNC_URL_VAR)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())?;
        let auth_token = std::env::var(SYNC_TOKEN_VAR)
            .ok()
            .filter(|s| !s.is_empty());
        Some(Self {
            base_url,
            auth_token,
        })
    }
}
