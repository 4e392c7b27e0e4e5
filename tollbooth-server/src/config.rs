//! Server configuration from the process environment.
//!
//! Everything the server needs is read once at startup into an explicit
//! [`ServerConfig`]; nothing else consults the environment afterwards. A
//! malformed value is a startup error, not a silently-applied default.
//!
//! # Environment Variables
//!
//! - `RECIPIENT_ADDRESS` — Payee account for all gated routes (defaults to a
//!   sample devnet address that receives real demo payments — set your own)
//! - `FACILITATOR_URL` — Base URL of the x402 facilitator
//! - `PORT` — TCP port to listen on (default: `3000`)
//! - `RUST_LOG` — Log level filter (default: `info`)

use tollbooth::client::DEFAULT_FACILITATOR_URL;
use tollbooth::types::{Network, RecipientAddress, RecipientAddressError};
use url::Url;

/// Sample devnet recipient used when `RECIPIENT_ADDRESS` is unset.
///
/// Payments made against it are gone for good, which is fine for a demo and
/// wrong for anything else. Startup logs a warning when this default is in
/// effect.
pub const DEFAULT_RECIPIENT_ADDRESS: &str = "seFkxFkXEY9JGEpCyPfCWTuPZG9WK6ucf95zvKCfsRX";

const DEFAULT_PORT: u16 = 3000;

/// Everything the server reads from its environment, resolved at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Payee account for all gated routes.
    pub recipient: RecipientAddress,
    /// Whether [`ServerConfig::recipient`] came from the built-in sample
    /// address rather than the environment.
    pub recipient_is_default: bool,
    /// Base URL of the facilitator service.
    pub facilitator_url: Url,
    /// Settlement network for all gated routes.
    pub network: Network,
    /// TCP port to listen on.
    pub port: u16,
}

/// Environment values that fail to parse at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `RECIPIENT_ADDRESS` is set but not a usable account token.
    #[error("invalid RECIPIENT_ADDRESS: {0}")]
    Recipient(#[from] RecipientAddressError),
    /// `FACILITATOR_URL` is set but not a valid URL.
    #[error("invalid FACILITATOR_URL {value:?}: {source}")]
    FacilitatorUrl {
        /// The rejected value.
        value: String,
        /// Underlying parse failure.
        source: url::ParseError,
    },
    /// `PORT` is set but not a TCP port number.
    #[error("invalid PORT {value:?}: {source}")]
    Port {
        /// The rejected value.
        value: String,
        /// Underlying parse failure.
        source: std::num::ParseIntError,
    },
}

impl ServerConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a set variable fails to parse. Unset
    /// variables fall back to defaults and never error.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_values(
            std::env::var("RECIPIENT_ADDRESS").ok(),
            std::env::var("FACILITATOR_URL").ok(),
            std::env::var("PORT").ok(),
        )
    }

    /// Builds configuration from already-fetched raw values.
    ///
    /// Split out from [`Self::from_env`] so tests can exercise parsing
    /// without mutating process-global environment state.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a provided value fails to parse.
    pub fn from_values(
        recipient: Option<String>,
        facilitator_url: Option<String>,
        port: Option<String>,
    ) -> Result<Self, ConfigError> {
        let recipient_is_default = recipient.is_none();
        let recipient: RecipientAddress = recipient
            .as_deref()
            .unwrap_or(DEFAULT_RECIPIENT_ADDRESS)
            .parse()?;

        let facilitator_url = facilitator_url.as_deref().unwrap_or(DEFAULT_FACILITATOR_URL);
        let facilitator_url =
            Url::parse(facilitator_url).map_err(|source| ConfigError::FacilitatorUrl {
                value: facilitator_url.to_owned(),
                source,
            })?;

        let port = match port {
            Some(raw) => raw.parse().map_err(|source| ConfigError::Port {
                value: raw,
                source,
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            recipient,
            recipient_is_default,
            facilitator_url,
            network: Network::SolanaDevnet,
            port,
        })
    }
}
