//! Configuration for epcr-api.
//!
//! Config is loaded once at startup and passed explicitly to whichever side
//! needs it — the server gets `[server]`, the probe gets `[probe]`. There are
//! no module-level singletons and no scattered env reads: everything funnels
//! through [`Config::load`].
//!
//! Sources, in order:
//! 1. An optional TOML file — path from the `EPCR_CONFIG` env var, or
//!    `epcr.toml` in the working directory if present.
//! 2. Environment overrides applied on top: `EPCR_PORT`, `EPCR_SERVICE_NAME`,
//!    `EPCR_API_BASE`.
//!
//! # Example
//! ```toml
//! [server]
//! port = 4000
//! service_name = "epcr-api"
//!
//! [probe]
//! api_base = "http://localhost:4000"
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Status-endpoint server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Connectivity-probe settings.
    #[serde(default)]
    pub probe: ProbeConfig,
}

/// Settings for the status-endpoint server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Port to listen on. Required for server mode; there is no implicit
    /// fallback — a missing port is a startup error, not a silent default.
    pub port: Option<u16>,

    /// Identifier reported in the `service` field of every health response
    /// (default: `"epcr-api"`).
    #[serde(default = "defaults::service_name")]
    pub service_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: None,
            service_name: defaults::service_name(),
        }
    }
}

/// Settings for the connectivity probe (`epcr-api --probe`).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProbeConfig {
    /// Base URL of the API to probe, e.g. `http://localhost:4000`.
    /// The probe appends the literal path `/health`.
    ///
    /// May be absent at load time — probe mode reports that as a failed
    /// check rather than refusing to start.
    pub api_base: Option<String>,
}

impl Config {
    /// Load configuration: optional TOML file, then env overrides, then
    /// validation. Fails fast with a descriptive error on a malformed file
    /// or an unparseable override.
    pub fn load() -> anyhow::Result<Self> {
        let mut config = match std::env::var("EPCR_CONFIG").map(PathBuf::from) {
            Ok(path) => Self::from_file(&path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            Err(_) => {
                let default = Path::new("epcr.toml");
                if default.exists() {
                    Self::from_file(default).context("Failed to load config from epcr.toml")?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file. Validation happens in [`Config::load`] after
    /// env overrides have been applied.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&content).context("parsing config TOML")
    }

    /// Apply env-var overrides on top of file values.
    ///
    /// Takes the lookup as a closure so tests can inject overrides without
    /// mutating process-wide environment state.
    fn apply_overrides<F>(&mut self, var: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = var("EPCR_PORT") {
            let port = v
                .parse::<u16>()
                .with_context(|| format!("EPCR_PORT `{v}` is not a valid port number"))?;
            self.server.port = Some(port);
        }
        if let Some(v) = var("EPCR_SERVICE_NAME") {
            self.server.service_name = v;
        }
        if let Some(v) = var("EPCR_API_BASE") {
            self.probe.api_base = Some(v);
        }
        Ok(())
    }

    fn validate(&self) -> anyhow::Result<()> {
        if let Some(port) = self.server.port {
            anyhow::ensure!(port != 0, "server port must be non-zero");
        }
        anyhow::ensure!(
            !self.server.service_name.is_empty(),
            "service_name must not be empty"
        );
        // probe.api_base is deliberately not validated here — a missing or
        // malformed base URL surfaces as a failed probe, not a startup error.
        Ok(())
    }

    /// The port the server must bind, or a descriptive error when none is
    /// configured anywhere.
    pub fn server_port(&self) -> anyhow::Result<u16> {
        self.server
            .port
            .context("no server port configured — set EPCR_PORT or [server] port in the config file")
    }
}

mod defaults {
    pub fn service_name() -> String {
        "epcr-api".to_string()
    }
}
