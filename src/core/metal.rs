//! Metal identities and unit conversion

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Grams in one troy ounce, the unit precious metals are quoted in.
pub const GRAMS_PER_TROY_OUNCE: f64 = 31.103_476_8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metal {
    Gold,
    Silver,
    Platinum,
    Palladium,
}

impl Metal {
    pub const ALL: [Metal; 4] = [Metal::Gold, Metal::Silver, Metal::Platinum, Metal::Palladium];

    pub fn name(&self) -> &'static str {
        match self {
            Metal::Gold => "Gold",
            Metal::Silver => "Silver",
            Metal::Platinum => "Platinum",
            Metal::Palladium => "Palladium",
        }
    }

    /// Yahoo Finance front-month futures symbol used for the historical series.
    pub fn default_ticker(&self) -> &'static str {
        match self {
            Metal::Gold => "GC=F",
            Metal::Silver => "SI=F",
            Metal::Platinum => "PL=F",
            Metal::Palladium => "PA=F",
        }
    }

    /// Canonicalizes a free-text label from the scraped price table.
    ///
    /// Labels arrive with arbitrary casing and whitespace ("GOLD", " Gold ").
    /// The unit suffix is expected to be stripped by the fetcher already.
    pub fn from_label(label: &str) -> Option<Metal> {
        let label = label.trim();
        Metal::ALL
            .into_iter()
            .find(|metal| label.eq_ignore_ascii_case(metal.name()))
    }
}

impl Display for Metal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Metal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metal::from_label(s).ok_or_else(|| anyhow::anyhow!("Unknown metal: {}", s))
    }
}
