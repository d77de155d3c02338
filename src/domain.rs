use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TaxError;

pub const DEFAULT_FALLBACK_NAME: &str = "NOAVAILABLETAXONOMY";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaxonId(String);

impl TaxonId {
    pub fn new(value: &str) -> Self {
        Self(value.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaxonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Borrow<str> for TaxonId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TaxonId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    Domain,
    Phylum,
    Class,
    Order,
    Family,
    Genus,
}

impl Rank {
    pub const ALL: [Rank; 6] = [
        Rank::Domain,
        Rank::Phylum,
        Rank::Class,
        Rank::Order,
        Rank::Family,
        Rank::Genus,
    ];

    pub fn prefix(self) -> &'static str {
        match self {
            Rank::Domain => "d__",
            Rank::Phylum => "p__",
            Rank::Class => "c__",
            Rank::Order => "o__",
            Rank::Family => "f__",
            Rank::Genus => "g__",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Rank::Domain => "domain",
            Rank::Phylum => "phylum",
            Rank::Class => "class",
            Rank::Order => "order",
            Rank::Family => "family",
            Rank::Genus => "genus",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Rank {
    type Err = TaxError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "domain" => Ok(Rank::Domain),
            "phylum" => Ok(Rank::Phylum),
            "class" => Ok(Rank::Class),
            "order" => Ok(Rank::Order),
            "family" => Ok(Rank::Family),
            "genus" => Ok(Rank::Genus),
            _ => Err(TaxError::InvalidRank(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankScheme {
    ranks: Vec<Rank>,
}

impl RankScheme {
    pub fn new(ranks: Vec<Rank>) -> Result<Self, TaxError> {
        if ranks.is_empty() {
            return Err(TaxError::InvalidConfig(
                "rank scheme must contain at least one rank".to_string(),
            ));
        }
        for (idx, rank) in ranks.iter().enumerate() {
            if ranks[..idx].contains(rank) {
                return Err(TaxError::InvalidConfig(format!(
                    "rank {rank} is listed more than once"
                )));
            }
        }
        Ok(Self { ranks })
    }

    pub fn ranks(&self) -> &[Rank] {
        &self.ranks
    }

    pub fn contains(&self, rank: Rank) -> bool {
        self.ranks.contains(&rank)
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }
}

impl Default for RankScheme {
    fn default() -> Self {
        Self {
            ranks: Rank::ALL.to_vec(),
        }
    }
}
