use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tracked symbols, keyed by ticker. Serializes as a plain `{"AAPL": "Apple Inc."}` object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StockPool {
    stocks: BTreeMap<String, String>,
}

impl StockPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the symbol is already tracked; the existing name is kept.
    pub fn add(&mut self, symbol: &str, name: &str) -> bool {
        if self.stocks.contains_key(symbol) {
            return false;
        }
        self.stocks.insert(symbol.to_string(), name.to_string());
        true
    }

    /// Returns false if the symbol was not tracked.
    pub fn remove(&mut self, symbol: &str) -> bool {
        self.stocks.remove(symbol).is_some()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.stocks.contains_key(symbol)
    }

    pub fn name(&self, symbol: &str) -> Option<&str> {
        self.stocks.get(symbol).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.stocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stocks.is_empty()
    }

    /// (symbol, name) pairs in symbol order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.stocks.iter().map(|(s, n)| (s.as_str(), n.as_str()))
    }
}

/// Favorite symbols in the order they were added
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Favorites {
    symbols: Vec<String>,
}

impl Favorites {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, symbol: &str) -> bool {
        if self.contains(symbol) {
            return false;
        }
        self.symbols.push(symbol.to_string());
        true
    }

    pub fn remove(&mut self, symbol: &str) -> bool {
        let before = self.symbols.len();
        self.symbols.retain(|s| s != symbol);
        self.symbols.len() != before
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s == symbol)
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }
}
