use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CANDIDATES: &[&str] = &[
    "http://localhost:8000",
    "http://127.0.0.1:8000",
    "http://192.168.15.7:8000",
];
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 2000;
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_API_TOKEN: &str = "123";
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub const DEFAULT_RELAY_URL: &str = "http://127.0.0.1:3000";
pub const TASKS_ENTRY_NAME: &str = "daily-routine-tasks";

/// Where and how to reach the inference service.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Used verbatim when set; disables probing.
    pub override_url: Option<String>,
    pub candidates: Vec<String>,
    pub probe_timeout: Duration,
    pub model: String,
    pub api_token: String,
}

impl UpstreamConfig {
    /// Endpoint used when every probe fails.
    pub fn fallback_url(&self) -> String {
        self.candidates
            .first()
            .cloned()
            .unwrap_or_else(|| DEFAULT_CANDIDATES[0].to_string())
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub upstream: UpstreamConfig,
    pub bind_addr: String,
    pub relay_url: String,
    pub tasks_path: PathBuf,
}

impl Config {
    pub fn load() -> Self {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let candidates: Vec<String> = get("UPSTREAM_CANDIDATES")
            .map(|list| {
                list.split(',')
                    .map(|s| s.trim().trim_end_matches('/').to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| DEFAULT_CANDIDATES.iter().map(|s| s.to_string()).collect());

        let probe_timeout_ms = get("UPSTREAM_PROBE_TIMEOUT_MS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PROBE_TIMEOUT_MS);

        let tasks_path = get("ROUTINE_TASKS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                let home = get("HOME").unwrap_or_else(|| ".".to_string());
                let mut path = PathBuf::from(home);
                path.push(".local");
                path.push("share");
                path.push("daily-routine");
                path.push(format!("{}.json", TASKS_ENTRY_NAME));
                path
            });

        Self {
            upstream: UpstreamConfig {
                override_url: get("UPSTREAM_API_URL"),
                candidates,
                probe_timeout: Duration::from_millis(probe_timeout_ms),
                model: get("UPSTREAM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                api_token: get("UPSTREAM_API_TOKEN")
                    .unwrap_or_else(|| DEFAULT_API_TOKEN.to_string()),
            },
            bind_addr: get("ROUTINE_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            relay_url: get("ROUTINE_RELAY_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_RELAY_URL.to_string()),
            tasks_path,
        }
    }
}
