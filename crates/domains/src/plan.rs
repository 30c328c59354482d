//! # Plans, networks and the entitlement clock
//!
//! A [`Plan`] is the subscription tier a user pays for; a [`Network`] is the
//! token transport the payment was sent over. The [`PlanCatalog`] pins the
//! price of each plan and the receiving wallet for each network.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::money::UsdAmount;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Monthly,
    Yearly,
    Lifetime,
}

impl Plan {
    pub const ALL: [Plan; 3] = [Plan::Monthly, Plan::Yearly, Plan::Lifetime];

    pub fn as_str(self) -> &'static str {
        match self {
            Plan::Monthly => "monthly",
            Plan::Yearly => "yearly",
            Plan::Lifetime => "lifetime",
        }
    }

    /// Length of the entitlement in calendar months.
    /// Lifetime is modelled as one hundred years.
    pub fn term_months(self) -> u32 {
        match self {
            Plan::Monthly => 1,
            Plan::Yearly => 12,
            Plan::Lifetime => 12 * 100,
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Plan {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monthly" => Ok(Plan::Monthly),
            "yearly" => Ok(Plan::Yearly),
            "lifetime" => Ok(Plan::Lifetime),
            other => Err(DomainError::validation(format!("unknown plan: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Network {
    #[serde(rename = "TRC20")]
    Trc20,
    #[serde(rename = "BEP20")]
    Bep20,
    #[serde(rename = "ERC20")]
    Erc20,
}

impl Network {
    pub const ALL: [Network; 3] = [Network::Trc20, Network::Bep20, Network::Erc20];

    pub fn as_str(self) -> &'static str {
        match self {
            Network::Trc20 => "TRC20",
            Network::Bep20 => "BEP20",
            Network::Erc20 => "ERC20",
        }
    }

    pub fn chain(self) -> &'static str {
        match self {
            Network::Trc20 => "Tron",
            Network::Bep20 => "BNB Smart Chain",
            Network::Erc20 => "Ethereum",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TRC20" => Ok(Network::Trc20),
            "BEP20" => Ok(Network::Bep20),
            "ERC20" => Ok(Network::Erc20),
            other => Err(DomainError::validation(format!("unknown network: {other}"))),
        }
    }
}

/// Computes when a premium grant for `plan` purchased at `now` expires.
///
/// Calendar arithmetic clamps to the last valid day of the target month,
/// so a monthly plan bought on Jan 31 runs until the end of February.
pub fn premium_expiry(plan: Plan, now: DateTime<Utc>) -> DomainResult<DateTime<Utc>> {
    now.checked_add_months(Months::new(plan.term_months()))
        .ok_or_else(|| DomainError::internal(format!("expiry overflow for {plan} plan")))
}

/// Prices and receiving wallets, fixed at startup from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanCatalog {
    pub monthly: UsdAmount,
    pub yearly: UsdAmount,
    pub lifetime: UsdAmount,
    pub trc20_wallet: String,
    pub bep20_wallet: String,
    pub erc20_wallet: String,
}

impl PlanCatalog {
    pub fn price(&self, plan: Plan) -> UsdAmount {
        match plan {
            Plan::Monthly => self.monthly,
            Plan::Yearly => self.yearly,
            Plan::Lifetime => self.lifetime,
        }
    }

    pub fn wallet(&self, network: Network) -> &str {
        match network {
            Network::Trc20 => &self.trc20_wallet,
            Network::Bep20 => &self.bep20_wallet,
            Network::Erc20 => &self.erc20_wallet,
        }
    }
}

impl Default for PlanCatalog {
    fn default() -> Self {
        Self {
            monthly: UsdAmount::from_cents(499),
            yearly: UsdAmount::from_cents(2899),
            lifetime: UsdAmount::from_cents(9999),
            trc20_wallet: "TQn9Y2khEsLJW1ChVWFMSMeRDow5KcbLSE".into(),
            bep20_wallet: "0x742d35CC6634C0532925a3b8D4C8F2E5aa6e1234".into(),
            erc20_wallet: "0x742d35CC6634C0532925a3b8D4C8F2E5aa6e5678".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn monthly_expiry_clamps_to_month_end() {
        let now = Utc.with_ymd_and_hms(2025, 1, 31, 10, 0, 0).unwrap();
        let expiry = premium_expiry(Plan::Monthly, now).unwrap();
        assert_eq!(expiry, Utc.with_ymd_and_hms(2025, 2, 28, 10, 0, 0).unwrap());
    }

    #[test]
    fn yearly_and_lifetime_offsets() {
        let now = Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap();
        assert_eq!(
            premium_expiry(Plan::Yearly, now).unwrap(),
            Utc.with_ymd_and_hms(2025, 2, 28, 0, 0, 0).unwrap()
        );
        assert_eq!(
            premium_expiry(Plan::Lifetime, now).unwrap(),
            Utc.with_ymd_and_hms(2124, 2, 29, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn network_wire_names() {
        assert_eq!(serde_json::to_string(&Network::Bep20).unwrap(), "\"BEP20\"");
        assert_eq!("ERC20".parse::<Network>().unwrap(), Network::Erc20);
        assert!("trc20".parse::<Network>().is_err());
    }

    #[test]
    fn default_catalog_prices() {
        let catalog = PlanCatalog::default();
        assert_eq!(catalog.price(Plan::Yearly).to_string(), "28.99");
        assert!(catalog.wallet(Network::Trc20).starts_with('T'));
    }
}
