//! Ticker symbols and the ordered symbol set driving one screening request.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
    #[error("symbol is empty after trimming")]
    Empty,
}

/// Uppercase, whitespace-trimmed ticker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    pub fn parse(raw: &str) -> Result<Self, SymbolError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SymbolError::Empty);
        }
        Ok(Self(trimmed.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Symbol {
    type Error = SymbolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

/// Distinct non-empty symbols in first-seen order.
///
/// Blank entries are skipped and repeated tickers (after normalization) keep
/// only their first position, so `[" aapl", "AAPL", "", "nvda"]` becomes
/// `[AAPL, NVDA]`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SymbolSet {
    symbols: Vec<Symbol>,
}

impl SymbolSet {
    pub fn from_raw<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut symbols: Vec<Symbol> = Vec::new();
        for item in raw {
            if let Ok(symbol) = Symbol::parse(item.as_ref()) {
                if !symbols.contains(&symbol) {
                    symbols.push(symbol);
                }
            }
        }
        Self { symbols }
    }

    /// Parse a comma separated list such as `"AAPL, nvda,,TSLA"`.
    pub fn from_csv(raw: &str) -> Self {
        Self::from_raw(raw.split(','))
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    /// Order-independent key: sorted symbols joined by commas.
    pub fn cache_key(&self) -> String {
        let mut sorted: Vec<&str> = self.symbols.iter().map(Symbol::as_str).collect();
        sorted.sort_unstable();
        sorted.join(",")
    }
}

impl<'a> IntoIterator for &'a SymbolSet {
    type Item = &'a Symbol;
    type IntoIter = std::slice::Iter<'a, Symbol>;

    fn into_iter(self) -> Self::IntoIter {
        self.symbols.iter()
    }
}
