use crate::quote::Quote;
use crate::symbol::Symbol;
use std::collections::HashSet;

/// Quotes keyed by symbol, keeping the first quote seen for each symbol.
#[derive(Debug, Default, Clone)]
pub struct QuoteSet {
    seen: HashSet<Symbol>,
    quotes: Vec<Quote>,
    duplicates: usize,
}

impl QuoteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold batch outputs in the order given.
    pub fn from_batches<I, B>(batches: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: IntoIterator<Item = Quote>,
    {
        let mut set = QuoteSet::new();
        for batch in batches {
            set.extend(batch);
        }
        set
    }

    /// Insert `quote` unless its symbol is already present.
    ///
    /// Returns whether the quote was kept.
    pub fn insert(&mut self, quote: Quote) -> bool {
        if self.seen.contains(&quote.symbol) {
            self.duplicates += 1;
            return false;
        }

        self.seen.insert(quote.symbol.clone());
        self.quotes.push(quote);
        true
    }

    pub fn get(&self, symbol: &Symbol) -> Option<&Quote> {
        if !self.seen.contains(symbol) {
            return None;
        }
        self.quotes.iter().find(|quote| &quote.symbol == symbol)
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Number of quotes dropped because their symbol was already present.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    /// Materialize the set in insertion order.
    pub fn into_quotes(self) -> Vec<Quote> {
        self.quotes
    }
}

impl Extend<Quote> for QuoteSet {
    fn extend<T: IntoIterator<Item = Quote>>(&mut self, iter: T) {
        for quote in iter {
            self.insert(quote);
        }
    }
}

impl FromIterator<Quote> for QuoteSet {
    fn from_iter<T: IntoIterator<Item = Quote>>(iter: T) -> Self {
        let mut set = QuoteSet::new();
        set.extend(iter);
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::{derive, RawQuote};

    fn quote(symbol: &str, price: f64) -> Quote {
        derive(&RawQuote {
            symbol: Some(symbol.to_string()),
            price: Some(price),
            high52: Some(100.0),
            low52: Some(50.0),
            ..RawQuote::default()
        })
        .unwrap()
    }

    #[test]
    fn test_insert_same_quote_twice_keeps_one() {
        let mut set = QuoteSet::new();

        assert!(set.insert(quote("AAA", 10.0)));
        assert!(!set.insert(quote("AAA", 10.0)));

        assert_eq!(set.len(), 1);
        assert_eq!(set.duplicates(), 1);
    }

    #[test]
    fn test_first_seen_wins() {
        let set: QuoteSet = vec![quote("AAA", 10.0), quote("AAA", 99.0)]
            .into_iter()
            .collect();

        let kept = set.get(&Symbol::new("AAA").unwrap()).unwrap();
        assert_eq!(kept.price, 10.0);
    }

    #[test]
    fn test_from_batches_prefers_earlier_batch() {
        let first = vec![quote("AAA", 1.0), quote("BBB", 2.0)];
        let second = vec![quote("AAA", 3.0), quote("CCC", 4.0)];

        let set = QuoteSet::from_batches(vec![first, second]);

        let prices: Vec<(String, f64)> = set
            .into_quotes()
            .into_iter()
            .map(|q| (q.symbol.to_string(), q.price))
            .collect();
        assert_eq!(
            prices,
            vec![
                ("AAA".to_string(), 1.0),
                ("BBB".to_string(), 2.0),
                ("CCC".to_string(), 4.0),
            ]
        );
    }

    #[test]
    fn test_empty() {
        let set = QuoteSet::from_batches(Vec::<Vec<Quote>>::new());

        assert!(set.is_empty());
        assert!(set.get(&Symbol::new("AAA").unwrap()).is_none());
    }
}
