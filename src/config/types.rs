use serde::Deserialize;

/// On-disk configuration. Every field is optional; CLI flags win.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub server_url: Option<String>,
    pub query_timeout_ms: Option<u64>,
    pub routine_store: Option<String>,
    pub no_hover: Option<bool>,
    pub verbose: Option<bool>,
}
