//! One-shot connectivity probe against the status endpoint.
//!
//! The probe fires exactly once per invocation: a single `GET {base}/health`,
//! then a terminal outcome. There are no retries, no backoff, no timeout
//! beyond the transport's own defaults — a failed check is simply reported.
//!
//! The state machine is deliberately small:
//!
//! ```text
//! Checking ──success──▶ Connected { payload }
//!     └──────failure──▶ Error { detail }
//! ```
//!
//! `Connected` and `Error` are terminal. A payload is only ever recorded on
//! the success path.

use thiserror::Error;

use crate::api::health::HealthStatus;
use crate::config::ProbeConfig;

/// Why a probe attempt failed.
///
/// Transport failures and non-success HTTP statuses both land here — the
/// transport layer alone does not treat a reachable-but-erroring server as a
/// failure, so the status check is explicit.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// No base URL was configured at all.
    #[error("no API base URL configured — set EPCR_API_BASE or [probe] api_base")]
    MissingBase,

    /// The configured base URL is not something we can issue HTTP against.
    #[error("API base URL `{0}` is not an http(s) URL")]
    InvalidBase(String),

    /// The server answered, but with a non-success status code.
    #[error("HTTP {0}")]
    Status(u16),

    /// The request never completed: connection refused, DNS failure,
    /// unreadable or unparseable body.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// Client-held record of the probe's progress, mirrored into the UI text.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeState {
    /// Entered immediately at startup, before any network activity.
    Checking,
    /// The check succeeded; `payload` is the parsed response, kept verbatim
    /// for display.
    Connected { payload: HealthStatus },
    /// The check failed; `detail` is a short diagnostic — `HTTP {code}` for
    /// an application-level failure, the transport error text otherwise.
    Error { detail: String },
}

impl ProbeState {
    /// The human-readable line shown for this state.
    pub fn status_line(&self) -> String {
        match self {
            Self::Checking => "Checking API...".to_string(),
            Self::Connected { .. } => "API Connected".to_string(),
            Self::Error { detail } => format!("API Not Connected: {detail}"),
        }
    }

    /// The recorded payload, present only in the connected state.
    pub fn payload(&self) -> Option<&HealthStatus> {
        match self {
            Self::Connected { payload } => Some(payload),
            _ => None,
        }
    }

    /// Whether the probe has settled. `Connected` and `Error` never
    /// transition further.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Checking)
    }
}

/// HTTP client for a single connectivity check.
///
/// Built from [`ProbeConfig`]; because [`reqwest::Client`] is cheap to
/// construct and the probe fires once, there is no shared client state.
#[derive(Debug)]
pub struct Probe {
    client: reqwest::Client,
    base_url: String,
}

impl Probe {
    /// Construct a probe for the configured base URL.
    ///
    /// # Errors
    /// [`ProbeError::MissingBase`] when no base URL is configured,
    /// [`ProbeError::InvalidBase`] when it is not an http(s) URL.
    pub fn new(cfg: &ProbeConfig) -> Result<Self, ProbeError> {
        let base = cfg.api_base.as_deref().ok_or(ProbeError::MissingBase)?;
        if !base.starts_with("http://") && !base.starts_with("https://") {
            return Err(ProbeError::InvalidBase(base.to_string()));
        }
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base.trim_end_matches('/').to_string(),
        })
    }

    /// Perform the single check and settle into a terminal [`ProbeState`].
    ///
    /// Never panics and never returns `Checking` — every failure, including a
    /// malformed response body, collapses into `Error` with a non-empty
    /// detail string.
    pub async fn check(&self) -> ProbeState {
        match self.fetch().await {
            Ok(payload) => {
                tracing::info!(service = %payload.service, "API reachable");
                ProbeState::Connected { payload }
            }
            Err(e) => {
                tracing::warn!(error = %e, "connectivity check failed");
                ProbeState::Error {
                    detail: e.to_string(),
                }
            }
        }
    }

    async fn fetch(&self) -> Result<HealthStatus, ProbeError> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;

        // A reachable server returning 500 is not a transport error; check
        // the status explicitly and carry the code in the diagnostic.
        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::Status(status.as_u16()));
        }

        Ok(response.json().await?)
    }
}

/// Build and fire the probe once, folding construction failures into the
/// same terminal error state as network failures. This is the entry point
/// probe mode uses — a missing or malformed base URL must surface as a
/// failed check, never as a crash.
pub async fn run(cfg: &ProbeConfig) -> ProbeState {
    match Probe::new(cfg) {
        Ok(probe) => probe.check().await,
        Err(e) => {
            tracing::warn!(error = %e, "connectivity check failed before any request");
            ProbeState::Error {
                detail: e.to_string(),
            }
        }
    }
}
