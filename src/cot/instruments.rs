//! Instrument catalog and keyword matching.
//!
//! Report rows carry free-form market names ("EURO FX - CHICAGO MERCANTILE
//! EXCHANGE"), so instruments are located by keyword sets: a row matches when
//! its uppercased name contains every keyword as a substring, in any order.

use serde::{Deserialize, Serialize};

/// A configured instrument: snapshot symbol plus the keywords that locate its
/// row in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    pub symbol: String,
    pub keywords: Vec<String>,
}

impl Instrument {
    pub fn new(symbol: &str, keywords: &[&str]) -> Self {
        Self {
            symbol: symbol.to_string(),
            keywords: keywords.iter().map(|k| k.to_uppercase()).collect(),
        }
    }

    /// True when every keyword appears in the (already uppercased) row name.
    pub fn matches(&self, upper_name: &str) -> bool {
        self.keywords.iter().all(|k| upper_name.contains(k.as_str()))
    }
}

/// The built-in catalog scanned against both report types.
///
/// Symbol casing is part of the snapshot contract with the dashboard layer
/// ("Gold" and "USOil" are not typos).
pub fn default_instruments() -> Vec<Instrument> {
    vec![
        // Currencies, indices, crypto (financial futures report)
        Instrument::new("CAD", &["CANADIAN", "DOLLAR"]),
        Instrument::new("AUD", &["AUSTRALIAN", "DOLLAR"]),
        Instrument::new("USD", &["USD", "INDEX"]),
        Instrument::new("ZAR", &["SOUTH", "AFRICAN", "RAND"]),
        Instrument::new("EUR", &["EURO", "FX"]),
        Instrument::new("NZD", &["NZ", "DOLLAR"]),
        Instrument::new("JPY", &["JAPANESE", "YEN"]),
        Instrument::new("GBP", &["BRITISH", "POUND"]),
        Instrument::new("CHF", &["SWISS", "FRANC"]),
        Instrument::new("BTC", &["BITCOIN"]),
        Instrument::new("NIKKEI", &["NIKKEI", "STOCK"]),
        Instrument::new("DOW", &["DJIA"]),
        Instrument::new("RUSSELL", &["RUSSELL", "2000"]),
        Instrument::new("SPX", &["S&P", "500"]),
        Instrument::new("NASDAQ", &["NASDAQ", "100"]),
        Instrument::new("US10T", &["10-YEAR", "TREASURY"]),
        // Metals and energy (disaggregated report)
        Instrument::new("SILVER", &["SILVER"]),
        Instrument::new("Gold", &["GOLD"]),
        Instrument::new("PLATINUM", &["PLATINUM"]),
        Instrument::new("COPPER", &["COPPER"]),
        Instrument::new("USOil", &["CRUDE", "OIL", "LIGHT"]),
    ]
}
