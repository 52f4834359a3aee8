//! Trading pair identifier.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// A `BASE-QUOTE` trading pair such as `ETH-USDT`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TradingPair {
    base: String,
    quote: String,
}

impl TradingPair {
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            quote: quote.into(),
        }
    }

    /// Base asset (what the order amount is denominated in).
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Quote asset (what prices are denominated in).
    pub fn quote(&self) -> &str {
        &self.quote
    }
}

impl FromStr for TradingPair {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('-');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(base), Some(quote), None) if !base.is_empty() && !quote.is_empty() => {
                Ok(Self::new(base, quote))
            }
            _ => Err(CoreError::InvalidPair(s.to_string())),
        }
    }
}

impl fmt::Display for TradingPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.base, self.quote)
    }
}

impl Serialize for TradingPair {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TradingPair {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pair() {
        let pair: TradingPair = "ETH-USDT".parse().unwrap();
        assert_eq!(pair.base(), "ETH");
        assert_eq!(pair.quote(), "USDT");
        assert_eq!(pair.to_string(), "ETH-USDT");
    }

    #[test]
    fn test_reject_malformed_pairs() {
        assert!("ETHUSDT".parse::<TradingPair>().is_err());
        assert!("ETH-".parse::<TradingPair>().is_err());
        assert!("-USDT".parse::<TradingPair>().is_err());
        assert!("A-B-C".parse::<TradingPair>().is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let pair: TradingPair = serde_json::from_str("\"BTC-USDC\"").unwrap();
        assert_eq!(pair, TradingPair::new("BTC", "USDC"));
        assert_eq!(serde_json::to_string(&pair).unwrap(), "\"BTC-USDC\"");
    }
}
