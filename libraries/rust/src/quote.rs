use crate::symbol::Symbol;
use serde::{Deserialize, Serialize};

/// Unvalidated per-symbol payload as normalized from the provider response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawQuote {
    pub symbol: Option<String>,
    pub company_name: Option<String>,
    pub ask: Option<f64>,
    pub ask_size: Option<u64>,
    pub bid: Option<f64>,
    pub bid_size: Option<u64>,
    pub high52: Option<f64>,
    pub low52: Option<f64>,
    pub average_volume: Option<u64>,
    /// Last trade price.
    pub price: Option<f64>,
    pub industry: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: Symbol,
    pub company_name: Option<String>,
    pub ask: Option<f64>,
    pub ask_size: Option<u64>,
    pub bid: Option<f64>,
    pub bid_size: Option<u64>,
    pub high52: f64,
    pub low52: Option<f64>,
    pub average_volume: Option<u64>,
    pub price: f64,
    pub growth_percent: Option<f64>,
    pub industry: Option<String>,
    pub is_new_high: bool,
}

/// Round to two decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Derive the new-high signal for a raw provider quote.
///
/// Returns `None` when the symbol, last trade price or 52-week high is
/// missing. Never panics.
pub fn derive(raw: &RawQuote) -> Option<Quote> {
    let symbol = Symbol::new(raw.symbol.clone()?).ok()?;
    let price = raw.price?;
    let high52 = raw.high52?;

    // low52 of zero or absent leaves growth undefined
    let growth_percent = match raw.low52 {
        Some(low52) if low52 != 0.0 => {
            let growth = round2((price - low52) / low52 * 100.0);
            growth.is_finite().then_some(growth)
        }
        _ => None,
    };

    Some(Quote {
        symbol,
        company_name: raw.company_name.clone(),
        ask: raw.ask,
        ask_size: raw.ask_size,
        bid: raw.bid,
        bid_size: raw.bid_size,
        high52,
        low52: raw.low52,
        average_volume: raw.average_volume,
        price,
        growth_percent,
        industry: raw.industry.clone(),
        is_new_high: price >= high52,
    })
}
