use serde::{Serialize, Serializer};
use std::fmt;

/// Tier keyed by the exact length of the longest marker run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Quality {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
    Mythic,
    /// Qualifying run with no tier assigned to its length
    Unclassified(usize),
}

impl Quality {
    pub fn from_run(run_length: usize) -> Self {
        match run_length {
            4 => Quality::Common,
            5 => Quality::Uncommon,
            6 => Quality::Rare,
            7 => Quality::Epic,
            8 => Quality::Legendary,
            9 => Quality::Mythic,
            other => Quality::Unclassified(other),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Quality::Common => "common",
            Quality::Uncommon => "uncommon",
            Quality::Rare => "rare",
            Quality::Epic => "epic",
            Quality::Legendary => "legendary",
            Quality::Mythic => "mythic",
            Quality::Unclassified(_) => "unclassified-quality",
        }
    }

    pub fn is_classified(&self) -> bool {
        !matches!(self, Quality::Unclassified(_))
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Quality {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}
