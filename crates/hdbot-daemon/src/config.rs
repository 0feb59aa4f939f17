//! `config.toml` plus `HDBOT_*` environment overrides.
//!
//! The file is looked up in the data directory. Missing sections and keys
//! take their defaults; unknown keys are rejected so typos surface at startup.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DaemonConfig {
    /// `[upstream]`: where campaign data comes from.
    pub upstream: UpstreamConfig,
    /// `[update]`: the trigger key and the poll schedule.
    pub update: UpdateConfig,
    /// `[storage]`: on-disk locations.
    pub storage: StorageConfig,
    /// `[advanced]`: logging.
    pub advanced: AdvancedConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UpstreamConfig {
    /// `/status` and `/campaign/{season}` are appended to this.
    pub base_url: String,
    /// Per-request HTTP timeout.
    pub request_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            request_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UpdateConfig {
    /// Pre-shared key checked by the update trigger. Required.
    pub key: String,
    /// Pause between poller runs, counted from the end of the previous run.
    pub interval_secs: u64,
    /// Bound on one status + season run.
    pub sequence_timeout_secs: u64,
    /// Run the background poller. With `false`, only `update` calls refresh.
    pub enabled: bool,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            key: String::new(),
            interval_secs: 60,
            sequence_timeout_secs: 30,
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Holds the database and the RPC socket.
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdvancedConfig {
    /// Default `tracing` level for `hdbot*` targets; `RUST_LOG` still wins.
    pub log_level: String,
}

impl Default for AdvancedConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
        }
    }
}

impl DaemonConfig {
    /// Read `config.toml` from the default data directory (defaults if
    /// absent) and apply the environment. Not validated.
    pub fn load() -> anyhow::Result<Self> {
        let env = |name: &str| std::env::var(name).ok();
        let path = default_data_dir(env).join(CONFIG_FILE);

        let mut config: Self = match std::fs::read_to_string(&path) {
            Ok(text) => {
                toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
        };
        config.apply_env(env)?;
        Ok(config)
    }

    /// Apply `HDBOT_*` overrides, reading variables through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(key) = lookup("HDBOT_UPDATE_KEY") {
            self.update.key = key;
        }
        if let Some(raw) = lookup("HDBOT_UPDATE_INTERVAL") {
            self.update.interval_secs = raw
                .trim()
                .parse()
                .with_context(|| format!("HDBOT_UPDATE_INTERVAL is not a number: {raw:?}"))?;
        }
        if let Some(url) = lookup("HDBOT_UPSTREAM_URL") {
            self.upstream.base_url = url;
        }
        if let Some(dir) = lookup("HDBOT_DATA_DIR").filter(|d| !d.is_empty()) {
            self.storage.data_dir = Some(PathBuf::from(dir));
        }
        Ok(())
    }

    /// Reject configurations the daemon cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.update.key.is_empty() {
            bail!("update key is not set (update.key or HDBOT_UPDATE_KEY)");
        }
        if self.upstream.base_url.is_empty() {
            bail!("upstream base URL is not set (upstream.base_url or HDBOT_UPSTREAM_URL)");
        }
        for (name, secs) in [
            ("update.interval_secs", self.update.interval_secs),
            ("update.sequence_timeout_secs", self.update.sequence_timeout_secs),
            ("upstream.request_timeout_secs", self.upstream.request_timeout_secs),
        ] {
            if secs == 0 {
                bail!("{name} must be at least 1");
            }
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream.request_timeout_secs)
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update.interval_secs)
    }

    pub fn sequence_timeout(&self) -> Duration {
        Duration::from_secs(self.update.sequence_timeout_secs)
    }

    pub fn data_dir(&self) -> PathBuf {
        match &self.storage.data_dir {
            Some(dir) => dir.clone(),
            None => default_data_dir(|name| std::env::var(name).ok()),
        }
    }
}

/// `$HDBOT_DATA_DIR`, else `$XDG_DATA_HOME/hdbot`, else `~/.hdbot`.
fn default_data_dir(lookup: impl Fn(&str) -> Option<String>) -> PathBuf {
    let non_empty = |name: &str| lookup(name).filter(|v| !v.is_empty());
    if let Some(dir) = non_empty("HDBOT_DATA_DIR") {
        return PathBuf::from(dir);
    }
    if let Some(xdg) = non_empty("XDG_DATA_HOME") {
        return PathBuf::from(xdg).join("hdbot");
    }
    match non_empty("HOME") {
        Some(home) => PathBuf::from(home).join(".hdbot"),
        None => std::env::temp_dir().join("hdbot"),
    }
}
