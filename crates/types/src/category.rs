// crates/types/src/category.rs
//! Report categories.
//!
//! Adding a category means adding a variant and listing it in
//! [`Category::ALL`]; nothing downstream matches on individual variants.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InvalidValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "MACD")]
    Macd,
    #[serde(rename = "RSI")]
    Rsi,
    Stochastic,
    Other1,
    Other2,
}

impl Category {
    /// Declared order, as shown on the dashboard and in the upload form.
    pub const ALL: [Category; 5] = [
        Category::Macd,
        Category::Rsi,
        Category::Stochastic,
        Category::Other1,
        Category::Other2,
    ];

    /// Canonical name, sent to the backend.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Macd => "MACD",
            Category::Rsi => "RSI",
            Category::Stochastic => "Stochastic",
            Category::Other1 => "Other1",
            Category::Other2 => "Other2",
        }
    }

    /// Lowercase form used in navigation paths.
    pub fn path_segment(self) -> String {
        self.as_str().to_ascii_lowercase()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = InvalidValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| InvalidValue::Category(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse_any_case() {
        assert_eq!("macd".parse::<Category>().unwrap(), Category::Macd);
        assert_eq!("RSI".parse::<Category>().unwrap(), Category::Rsi);
        assert_eq!("stochastic".parse::<Category>().unwrap(), Category::Stochastic);
        assert_eq!("OTHER2".parse::<Category>().unwrap(), Category::Other2);
    }

    #[test]
    fn test_category_rejects_unknown() {
        assert!(matches!("bollinger".parse::<Category>(), Err(InvalidValue::Category(_))));
        assert!("".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_path_segment_round_trips() {
        for c in Category::ALL {
            assert_eq!(c.path_segment().parse::<Category>().unwrap(), c);
        }
    }

    #[test]
    fn test_category_serializes_canonical_name() {
        assert_eq!(serde_json::to_string(&Category::Macd).unwrap(), r#""MACD""#);
        assert_eq!(serde_json::to_string(&Category::Other1).unwrap(), r#""Other1""#);
    }
}
