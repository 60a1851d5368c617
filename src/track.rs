//! Labels and provenance tags shared across the crate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AbstrakError, Result};

/// Study track an abstract belongs to.
///
/// The derived ordering (`Rpl < Tkj`) is the class order used for probability
/// columns, metric tables and confusion matrices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Track {
    /// Rekayasa Perangkat Lunak (software engineering). Default class of the
    /// keyword labeler.
    #[serde(rename = "RPL")]
    Rpl,
    /// Teknik Komputer dan Jaringan (computer networking).
    #[serde(rename = "TKJ")]
    Tkj,
}

impl Track {
    /// Both tracks in class order.
    pub const ALL: [Track; 2] = [Track::Rpl, Track::Tkj];

    /// Label used when the keyword labeler has nothing to go on.
    pub const DEFAULT: Track = Track::Rpl;

    /// Short code used in storage and output.
    pub fn code(&self) -> &'static str {
        match self {
            Track::Rpl => "RPL",
            Track::Tkj => "TKJ",
        }
    }

    /// Position in class order.
    pub fn index(self) -> usize {
        match self {
            Track::Rpl => 0,
            Track::Tkj => 1,
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Track {
    type Err = AbstrakError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RPL" => Ok(Track::Rpl),
            "TKJ" => Ok(Track::Tkj),
            other => Err(AbstrakError::invalid_argument(format!(
                "unknown track label '{other}' (expected RPL or TKJ)"
            ))),
        }
    }
}

/// Where a manual label came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelOrigin {
    /// Assigned by a person.
    Manual,
    /// Assigned by the keyword labeler while bootstrapping.
    Heuristic,
}

/// Provenance of a classification request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Text typed or pasted by a user.
    Manual,
    /// Text extracted from an uploaded file.
    Upload,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Source::Manual => "manual",
            Source::Upload => "upload",
        };
        f.write_str(s)
    }
}

/// Coarse confidence band for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    /// Band for a confidence in `[0, 1]`: high from 0.8, medium from 0.6.
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.8 {
            ConfidenceLevel::High
        } else if confidence >= 0.6 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConfidenceLevel::High => "high",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::Low => "low",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_parse_and_display() {
        assert_eq!("rpl".parse::<Track>().unwrap(), Track::Rpl);
        assert_eq!(" TKJ ".parse::<Track>().unwrap(), Track::Tkj);
        assert!("MM".parse::<Track>().is_err());
        assert_eq!(Track::Tkj.to_string(), "TKJ");
        assert!(Track::Rpl < Track::Tkj);
    }

    #[test]
    fn test_track_serde_codes() {
        let json = serde_json::to_string(&Track::Rpl).unwrap();
        assert_eq!(json, "\"RPL\"");
        let back: Track = serde_json::from_str("\"TKJ\"").unwrap();
        assert_eq!(back, Track::Tkj);
    }

    #[test]
    fn test_confidence_level() {
        assert_eq!(ConfidenceLevel::from_confidence(0.95), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_confidence(0.8), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_confidence(0.7), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_confidence(0.3), ConfidenceLevel::Low);
    }
}
