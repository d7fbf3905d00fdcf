use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use anyhow::{bail, Context};
use serde::Deserialize;

use crate::controller::state::StaleResponsePolicy;

pub const DEFAULT_CONFIG_FILE: &str = "anomaly-console.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub server_url: String,
    pub output_dir: PathBuf,
    pub stale_responses: StaleResponsePolicy,
    pub request_timeout_secs: Option<u64>,
    /// Live capture is optional; when off the capture workflow is never wired.
    pub capture_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".into(),
            output_dir: PathBuf::from("downloads"),
            stale_responses: StaleResponsePolicy::Discard,
            request_timeout_secs: None,
            capture_enabled: true,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    server_url: Option<String>,
    output_dir: Option<PathBuf>,
    stale_responses: Option<StaleResponsePolicy>,
    request_timeout_secs: Option<u64>,
    capture_enabled: Option<bool>,
}

/// Defaults, then the TOML file, then the process environment.
///
/// An explicitly named file must exist; the default file is optional.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let raw = match config_path {
        Some(path) => Some(
            fs::read_to_string(path)
                .with_context(|| format!("failed to read config file '{}'", path.display()))?,
        ),
        None => fs::read_to_string(DEFAULT_CONFIG_FILE).ok(),
    };
    if let Some(raw) = raw {
        apply_file(&mut settings, &raw)?;
    }

    apply_env(&mut settings, |name| std::env::var(name).ok())?;
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw).context("invalid config file")?;
    if let Some(v) = file_cfg.server_url {
        settings.server_url = v;
    }
    if let Some(v) = file_cfg.output_dir {
        settings.output_dir = v;
    }
    if let Some(v) = file_cfg.stale_responses {
        settings.stale_responses = v;
    }
    if file_cfg.request_timeout_secs.is_some() {
        settings.request_timeout_secs = file_cfg.request_timeout_secs;
    }
    if let Some(v) = file_cfg.capture_enabled {
        settings.capture_enabled = v;
    }
    Ok(())
}

fn apply_env(
    settings: &mut Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<()> {
    if let Some(v) = lookup("ANOMALY_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = lookup("APP__SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = lookup("APP__OUTPUT_DIR") {
        settings.output_dir = PathBuf::from(v);
    }
    if let Some(v) = lookup("APP__STALE_RESPONSES") {
        settings.stale_responses = v.parse()?;
    }
    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
        let parsed = v
            .parse::<u64>()
            .with_context(|| format!("APP__REQUEST_TIMEOUT_SECS must be an integer, got '{v}'"))?;
        settings.request_timeout_secs = Some(parsed);
    }
    if let Some(v) = lookup("APP__CAPTURE_ENABLED") {
        settings.capture_enabled = parse_flag(&v)?;
    }
    Ok(())
}

fn parse_flag(raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("expected a boolean flag, got '{other}'"),
    }
}

impl FromStr for StaleResponsePolicy {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "discard" => Ok(StaleResponsePolicy::Discard),
            "apply" => Ok(StaleResponsePolicy::Apply),
            other => bail!("unknown stale response policy '{other}' (expected 'discard' or 'apply')"),
        }
    }
}
