use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Cabin classes seat inventory is tracked against. One (flight, cabin)
/// pair is the smallest bookable resource unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CabinClass {
    Economy,
    Business,
    First,
}

impl CabinClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            CabinClass::Economy => "ECONOMY",
            CabinClass::Business => "BUSINESS",
            CabinClass::First => "FIRST",
        }
    }
}

impl fmt::Display for CabinClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CabinClass {
    type Err = UnknownCabinClass;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ECONOMY" => Ok(CabinClass::Economy),
            "BUSINESS" => Ok(CabinClass::Business),
            "FIRST" => Ok(CabinClass::First),
            other => Err(UnknownCabinClass(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown cabin class: {0}")]
pub struct UnknownCabinClass(pub String);
