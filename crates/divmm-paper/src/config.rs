//! Paper exchange configuration.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Paper exchange configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperConfig {
    /// Starting balances per asset.
    #[serde(default = "default_initial_balances")]
    pub initial_balances: BTreeMap<String, Decimal>,

    /// Distance from mid to best bid/ask as a fraction of mid.
    #[serde(default = "default_book_half_spread")]
    pub book_half_spread: Decimal,

    /// Maker fee as a fraction of notional, charged in the received asset.
    #[serde(default)]
    pub maker_fee: Decimal,
}

impl Default for PaperConfig {
    fn default() -> Self {
        Self {
            initial_balances: default_initial_balances(),
            book_half_spread: default_book_half_spread(),
            maker_fee: Decimal::ZERO,
        }
    }
}

fn default_initial_balances() -> BTreeMap<String, Decimal> {
    BTreeMap::from([
        ("ETH".to_string(), Decimal::ONE),
        ("USDT".to_string(), Decimal::new(2000, 0)),
    ])
}

fn default_book_half_spread() -> Decimal {
    Decimal::new(5, 5) // 0.00005 = 0.5 bp
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_config() {
        let config = PaperConfig::default();
        assert_eq!(config.initial_balances["ETH"], dec!(1));
        assert_eq!(config.initial_balances["USDT"], dec!(2000));
        assert_eq!(config.book_half_spread, dec!(0.00005));
        assert_eq!(config.maker_fee, Decimal::ZERO);
    }

    #[test]
    fn test_toml_balances() {
        let config: PaperConfig = toml::from_str(
            r#"
            maker_fee = "0.001"
            [initial_balances]
            BTC = "0.5"
            USDT = "10000"
            "#,
        )
        .unwrap();
        assert_eq!(config.initial_balances.len(), 2);
        assert_eq!(config.initial_balances["BTC"], dec!(0.5));
        assert_eq!(config.maker_fee, dec!(0.001));
        assert_eq!(config.book_half_spread, dec!(0.00005));
    }
}
