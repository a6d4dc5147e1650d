//! Billing snapshot taken from the model provider before a report is generated.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Currency preferred when the provider reports several balances.
pub const REFERENCE_CURRENCY: &str = "CNY";

/// Wire shape of the provider's balance endpoint.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BalanceResponse {
    #[serde(default)]
    pub is_available: Option<bool>,
    #[serde(default)]
    pub balance_infos: Vec<BalanceEntry>,
}

/// One per-currency entry of a [`BalanceResponse`].
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BalanceEntry {
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub total_balance: Decimal,
    #[serde(default)]
    pub granted_balance: Decimal,
    #[serde(default)]
    pub topped_up_balance: Decimal,
}

fn default_currency() -> String {
    REFERENCE_CURRENCY.to_string()
}

/// The balance values persisted alongside a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub available: bool,
    pub currency: String,
    pub total: Decimal,
    pub granted: Decimal,
    pub topped_up: Decimal,
}

impl Default for BalanceSnapshot {
    fn default() -> Self {
        Self {
            available: true,
            currency: REFERENCE_CURRENCY.to_string(),
            total: Decimal::ZERO,
            granted: Decimal::ZERO,
            topped_up: Decimal::ZERO,
        }
    }
}

impl BalanceSnapshot {
    /// Select a snapshot from a provider response.
    ///
    /// The entry in `reference_currency` wins regardless of its position;
    /// otherwise the first entry is used. With no entries at all the
    /// zeroed default is returned.
    pub fn from_response(response: &BalanceResponse, reference_currency: &str) -> Self {
        let entry = response
            .balance_infos
            .iter()
            .find(|e| e.currency == reference_currency)
            .or_else(|| response.balance_infos.first());

        match entry {
            Some(e) => Self {
                available: response.is_available.unwrap_or(true),
                currency: e.currency.clone(),
                total: e.total_balance,
                granted: e.granted_balance,
                topped_up: e.topped_up_balance,
            },
            None => Self {
                currency: reference_currency.to_string(),
                ..Self::default()
            },
        }
    }
}
