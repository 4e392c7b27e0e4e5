//! Shared domain types for the payment gate.
//!
//! Settlement networks, the payee identity, and the opaque payment proof a
//! caller attaches to a request.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Settlement network a payment is recorded on.
///
/// A closed enumeration: routes can only be priced on networks the gate
/// knows about, so a typo in configuration fails at startup instead of
/// producing an unpayable price tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Network {
    /// Solana mainnet.
    Solana,
    /// Solana devnet, the network the demo charges on.
    SolanaDevnet,
}

impl Network {
    /// Returns the canonical wire name of the network.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Solana => "solana",
            Self::SolanaDevnet => "solana-devnet",
        }
    }
}

impl Display for Network {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a network name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown network: {0}")]
pub struct UnknownNetworkError(pub String);

impl FromStr for Network {
    type Err = UnknownNetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solana" => Ok(Self::Solana),
            "solana-devnet" => Ok(Self::SolanaDevnet),
            other => Err(UnknownNetworkError(other.to_owned())),
        }
    }
}

/// The payee account on the settlement network.
///
/// Opaque to the gate: it is handed to the facilitator and echoed in 402
/// metadata, never interpreted. Construction applies a shape check only
/// (a single non-empty ASCII token) so obviously broken configuration
/// fails before the server binds its port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipientAddress(String);

/// Error returned for a malformed recipient address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("recipient address must be a single non-empty ASCII token, got {0:?}")]
pub struct RecipientAddressError(pub String);

impl RecipientAddress {
    /// Returns the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for RecipientAddress {
    type Err = RecipientAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let well_formed = !trimmed.is_empty()
            && trimmed
                .chars()
                .all(|c| c.is_ascii_graphic());
        if well_formed {
            Ok(Self(trimmed.to_owned()))
        } else {
            Err(RecipientAddressError(s.to_owned()))
        }
    }
}

impl Display for RecipientAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RecipientAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Client-supplied evidence that a required payment has been made.
///
/// The gate never looks inside: the header value is captured verbatim and
/// forwarded to the facilitator, which owns its interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentProof(String);

impl PaymentProof {
    /// Wraps a raw header value.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the proof exactly as the caller sent it.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Serialize for PaymentProof {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
