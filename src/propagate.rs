use std::fmt;

use clap::ValueEnum;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::domain::{RankScheme, TaxonId};
use crate::lineage::{LineageMap, Lineages};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropagatedLineage {
    fields: Vec<String>,
}

impl PropagatedLineage {
    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

impl fmt::Display for PropagatedLineage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fields.join("; "))
    }
}

pub type PropagatedLineages = IndexMap<TaxonId, PropagatedLineage>;

pub trait PropagationStrategy {
    fn propagate(
        &self,
        lineages: &Lineages,
        scheme: &RankScheme,
        fallback: &str,
    ) -> PropagatedLineages;
}

/// Repeats the last name seen. The name carries over from one taxon id to the
/// next in iteration order, so a taxon missing its upper ranks inherits them
/// from the taxon processed before it.
#[derive(Debug, Clone, Copy, Default)]
pub struct CarryOver;

impl PropagationStrategy for CarryOver {
    fn propagate(
        &self,
        lineages: &Lineages,
        scheme: &RankScheme,
        fallback: &str,
    ) -> PropagatedLineages {
        let mut current = fallback.to_string();
        lineages
            .iter()
            .map(|(taxon_id, map)| (taxon_id.clone(), fill(map, scheme, &mut current)))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PerLineage;

impl PropagationStrategy for PerLineage {
    fn propagate(
        &self,
        lineages: &Lineages,
        scheme: &RankScheme,
        fallback: &str,
    ) -> PropagatedLineages {
        lineages
            .iter()
            .map(|(taxon_id, map)| {
                let mut current = fallback.to_string();
                (taxon_id.clone(), fill(map, scheme, &mut current))
            })
            .collect()
    }
}

fn fill(map: &LineageMap, scheme: &RankScheme, current: &mut String) -> PropagatedLineage {
    let fields = scheme
        .ranks()
        .iter()
        .map(|rank| {
            if let Some(name) = map.get(*rank) {
                current.clear();
                current.push_str(name);
            }
            format!("{}{}", rank.prefix(), current)
        })
        .collect();
    PropagatedLineage { fields }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PropagationKind {
    #[default]
    CarryOver,
    PerLineage,
}

impl PropagationKind {
    pub fn strategy(self) -> Box<dyn PropagationStrategy> {
        match self {
            PropagationKind::CarryOver => Box::new(CarryOver),
            PropagationKind::PerLineage => Box::new(PerLineage),
        }
    }
}

impl fmt::Display for PropagationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropagationKind::CarryOver => write!(f, "carry-over"),
            PropagationKind::PerLineage => write!(f, "per-lineage"),
        }
    }
}
