//! Static route pricing.
//!
//! Gated routes form a closed enumeration: the price table is built once at
//! startup from explicit declarations, every declared route must carry a
//! price, and lookup is an exact match on method and path. A route the table
//! does not know about is simply free.

use http::Method;
use serde::Serialize;

use crate::amount::MoneyAmount;
use crate::types::{Network, RecipientAddress};

/// The closed set of payment-gated routes.
///
/// Keying prices by this enum (instead of raw method/path strings) means an
/// unknown route cannot be priced at all, and a gated route missing from the
/// table is a startup error rather than silently free access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatedRoute {
    /// `GET /premium` — the cheap protected endpoint.
    Premium,
    /// `GET /expensive` — the pricier protected endpoint.
    Expensive,
}

impl GatedRoute {
    /// Every gated route, in registration order.
    pub const ALL: [Self; 2] = [Self::Premium, Self::Expensive];

    /// HTTP method of the route.
    #[must_use]
    pub fn method(&self) -> Method {
        match self {
            Self::Premium | Self::Expensive => Method::GET,
        }
    }

    /// Request path of the route.
    #[must_use]
    pub const fn path(&self) -> &'static str {
        match self {
            Self::Premium => "/premium",
            Self::Expensive => "/expensive",
        }
    }

    /// Human-readable description, included in payment metadata.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Premium => "Premium content",
            Self::Expensive => "Very expensive premium content",
        }
    }
}

/// Price attached to a single gated route.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceTag {
    /// Required payment amount in USD.
    pub amount: MoneyAmount,
    /// Payee account on the settlement network.
    pub pay_to: RecipientAddress,
    /// Network the payment settles on.
    pub network: Network,
}

/// A gated route together with its price.
#[derive(Debug, Clone)]
pub struct PricedRoute {
    /// The route being gated.
    pub route: GatedRoute,
    /// Its price tag.
    pub tag: PriceTag,
}

impl PricedRoute {
    /// Wire-format payment metadata for 402 responses.
    #[must_use]
    pub fn requirements(&self) -> PaymentRequirements {
        PaymentRequirements {
            amount: self.tag.amount,
            pay_to: self.tag.pay_to.clone(),
            network: self.tag.network,
            resource: self.route.path(),
            description: self.route.description(),
        }
    }
}

/// Machine-readable payment metadata carried in a 402 response body.
///
/// Contains everything a compliant client needs to construct a valid
/// payment proof and retry: exact amount, recipient, and network.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequirements {
    /// Required payment amount, echoed exactly as configured.
    pub amount: MoneyAmount,
    /// Recipient account identity.
    pub pay_to: RecipientAddress,
    /// Settlement network identifier.
    pub network: Network,
    /// Path of the protected resource.
    pub resource: &'static str,
    /// What the payment grants access to.
    pub description: &'static str,
}

/// Errors detected while building a [`PriceTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PriceTableError {
    /// The same route was declared twice.
    #[error("route {} declared more than once", .0.path())]
    DuplicateRoute(GatedRoute),
    /// A gated route has no price, which would make it silently free.
    #[error("gated route {} has no price declared", .0.path())]
    UnpricedRoute(GatedRoute),
}

/// Immutable mapping from gated routes to their prices.
///
/// Built once at startup and shared read-only across all requests; lookup
/// never mutates.
#[derive(Debug, Clone)]
pub struct PriceTable {
    entries: Vec<PricedRoute>,
}

impl PriceTable {
    /// Starts building a price table.
    #[must_use]
    pub const fn builder() -> PriceTableBuilder {
        PriceTableBuilder {
            entries: Vec::new(),
        }
    }

    /// Exact-match lookup by HTTP method and path.
    ///
    /// `None` means no payment is required — the common case.
    #[must_use]
    pub fn lookup(&self, method: &Method, path: &str) -> Option<&PricedRoute> {
        self.entries
            .iter()
            .find(|entry| entry.route.method() == *method && entry.route.path() == path)
    }

    /// All priced routes, in declaration order.
    #[must_use]
    pub fn entries(&self) -> &[PricedRoute] {
        &self.entries
    }
}

/// Builder validating price declarations before the table is used.
#[derive(Debug)]
pub struct PriceTableBuilder {
    entries: Vec<PricedRoute>,
}

impl PriceTableBuilder {
    /// Declares the price of a gated route.
    #[must_use]
    pub fn price(mut self, route: GatedRoute, tag: PriceTag) -> Self {
        self.entries.push(PricedRoute { route, tag });
        self
    }

    /// Validates the declarations and freezes the table.
    ///
    /// # Errors
    ///
    /// Returns [`PriceTableError`] if a route is declared twice or a gated
    /// route is left without a price.
    pub fn build(self) -> Result<PriceTable, PriceTableError> {
        for (i, entry) in self.entries.iter().enumerate() {
            if self.entries[..i].iter().any(|e| e.route == entry.route) {
                return Err(PriceTableError::DuplicateRoute(entry.route));
            }
        }
        for route in GatedRoute::ALL {
            if !self.entries.iter().any(|e| e.route == route) {
                return Err(PriceTableError::UnpricedRoute(route));
            }
        }
        Ok(PriceTable {
            entries: self.entries,
        })
    }
}
