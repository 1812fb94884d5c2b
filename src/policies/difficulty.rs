//! # Difficulty levels.
//!
//! [`Difficulty`] scales the per-step time budget:
//!
//! ```text
//! Easy   → ×1.2  (20% more time)
//! Normal → ×1.0
//! Hard   → ×0.8  (20% less time)
//! ```
//!
//! Factors are kept as integer percentages so budgets are exact in milliseconds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::OrderError;

/// Difficulty selected for an order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    /// Default level.
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    /// Time factor as an integer percentage (`Easy = 120`, `Normal = 100`, `Hard = 80`).
    #[inline]
    pub fn factor_percent(self) -> u32 {
        match self {
            Difficulty::Easy => 120,
            Difficulty::Normal => 100,
            Difficulty::Hard => 80,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "normal" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(OrderError::InvalidDifficulty {
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Hard".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert_eq!(" easy ".parse::<Difficulty>(), Ok(Difficulty::Easy));
        assert_eq!("normal".parse::<Difficulty>(), Ok(Difficulty::Normal));
    }

    #[test]
    fn rejects_unknown_levels() {
        let err = "nightmare".parse::<Difficulty>().unwrap_err();
        assert_eq!(err.as_label(), "order_invalid_difficulty");
    }

    #[test]
    fn default_is_normal() {
        assert_eq!(Difficulty::default(), Difficulty::Normal);
        assert_eq!(Difficulty::Easy.factor_percent(), 120);
    }
}
