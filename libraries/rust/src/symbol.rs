use crate::errors::Error;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ticker symbol as understood by the market-data provider.
///
/// Always non-empty; equality is exact string match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    pub fn new(value: impl Into<String>) -> Result<Self, Error> {
        let value = value.into();
        let trimmed = value.trim();

        if trimmed.is_empty() {
            return Err(Error::InvalidSymbol(value));
        }

        Ok(Symbol(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Symbol {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Symbol::new(value)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_trims_whitespace() {
        let symbol = Symbol::new("  AAPL ").unwrap();

        assert_eq!(symbol.as_str(), "AAPL");
    }

    #[test]
    fn test_new_rejects_blank() {
        assert!(matches!(Symbol::new(""), Err(Error::InvalidSymbol(_))));
        assert!(matches!(Symbol::new("   "), Err(Error::InvalidSymbol(_))));
    }

    #[test]
    fn test_deserialize_rejects_empty_string() {
        let result = serde_json::from_value::<Symbol>(json!(""));

        assert!(result.is_err());
    }

    #[test]
    fn test_serialize_as_plain_string() {
        let symbol = Symbol::new("MSFT").unwrap();

        assert_eq!(serde_json::to_value(&symbol).unwrap(), json!("MSFT"));
    }
}
