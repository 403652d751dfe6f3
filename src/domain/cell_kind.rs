// ============================================================
// Layer 3 — Recurrent Cell Kind
// ============================================================
// The classifier runs either GRU or LSTM cells in both
// directions. This enum is the framework-free name for that
// choice so the CLI and saved configs can carry it without
// depending on Burn.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    #[default]
    Gru,
    Lstm,
}

impl CellKind {
    /// Number of gate blocks in the fused projection
    /// GRU: update, reset, candidate. LSTM: input, forget, cell, output.
    pub fn gates(self) -> usize {
        match self {
            CellKind::Gru  => 3,
            CellKind::Lstm => 4,
        }
    }
}

impl FromStr for CellKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gru"  => Ok(CellKind::Gru),
            "lstm" => Ok(CellKind::Lstm),
            other  => Err(format!("unknown cell kind '{other}' (expected gru or lstm)")),
        }
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellKind::Gru  => write!(f, "gru"),
            CellKind::Lstm => write!(f, "lstm"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        assert_eq!("GRU".parse::<CellKind>().unwrap(), CellKind::Gru);
        assert_eq!("lstm".parse::<CellKind>().unwrap(), CellKind::Lstm);
        assert!("rnn".parse::<CellKind>().is_err());
        assert_eq!(CellKind::Lstm.to_string(), "lstm");
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&CellKind::Lstm).unwrap();
        assert_eq!(json, "\"lstm\"");
        let back: CellKind = serde_json::from_str("\"gru\"").unwrap();
        assert_eq!(back, CellKind::Gru);
    }
}
