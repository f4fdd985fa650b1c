use super::records::ConsumptionRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Key used when a record has no value for the selected dimension
pub const UNKNOWN_KEY: &str = "Unknown";

/// Categorical field used to group displayed data
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Dimension {
    #[default]
    CloudProvider,
    Region,
    Account,
    Service,
    FinancialDomain,
}

impl Dimension {
    /// Name used on the wire by the dashboard service
    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::CloudProvider => "CloudProvider",
            Dimension::Region => "Region",
            Dimension::Account => "Account",
            Dimension::Service => "Service",
            Dimension::FinancialDomain => "FinancialDomain",
        }
    }

    /// Grouping key of a record for this dimension
    pub fn key_of<'a>(&self, record: &'a ConsumptionRecord) -> &'a str {
        let value = match self {
            Dimension::CloudProvider => Some(record.provider_name.as_str()),
            Dimension::Region => record.region.as_deref(),
            Dimension::Account => record.account.as_deref(),
            Dimension::Service => record.service.as_deref(),
            Dimension::FinancialDomain => record.financial_domain.as_deref(),
        };
        match value {
            Some(v) if !v.trim().is_empty() => v,
            _ => UNKNOWN_KEY,
        }
    }

    /// Whether series budgets are tracked for this dimension
    pub fn tracks_budget(&self) -> bool {
        matches!(self, Dimension::FinancialDomain)
    }

    /// Dimensions whose series names are prefixed by a provider and can be
    /// narrowed to a subset of providers
    pub fn supports_provider_filter(&self) -> bool {
        matches!(
            self,
            Dimension::Service | Dimension::Account | Dimension::Region
        )
    }
}

impl FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "cloudprovider" | "provider" => Ok(Dimension::CloudProvider),
            "region" => Ok(Dimension::Region),
            "account" => Ok(Dimension::Account),
            "service" => Ok(Dimension::Service),
            "financialdomain" => Ok(Dimension::FinancialDomain),
            _ => Err(format!("Unknown dimension: {}", s)),
        }
    }
}

impl TryFrom<String> for Dimension {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Dimension> for String {
    fn from(value: Dimension) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
