use serde::{Deserialize, Serialize};
use std::fmt;

/// Screw head drive types the detector is trained on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ScrewClass {
    Phillips,
    Pozidriv,
    Torx,
    Hex,
    Slotted,
}

impl ScrewClass {
    pub const ALL: [ScrewClass; 5] = [
        ScrewClass::Phillips,
        ScrewClass::Pozidriv,
        ScrewClass::Torx,
        ScrewClass::Hex,
        ScrewClass::Slotted,
    ];

    /// Name used on the wire by the detector.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScrewClass::Phillips => "phillips",
            ScrewClass::Pozidriv => "pozidriv",
            ScrewClass::Torx => "torx",
            ScrewClass::Hex => "hex",
            ScrewClass::Slotted => "slotted",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScrewClass::Phillips => "Phillips (PH)",
            ScrewClass::Pozidriv => "Pozidriv (PZ)",
            ScrewClass::Torx => "Torx (T)",
            ScrewClass::Hex => "Allen (H)",
            ScrewClass::Slotted => "Slotted (SL)",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|class| class.as_str() == name)
    }
}

impl fmt::Display for ScrewClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
