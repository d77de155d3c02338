use indexmap::IndexMap;
use tracing::debug;

use crate::domain::{Rank, RankScheme, TaxonId};
use crate::error::TaxError;
use crate::sanitize::NameSanitizer;
use crate::taxa::TaxonRecordStore;
use crate::tree::{NodeIndex, TaxonTree};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineageMap {
    entries: IndexMap<Rank, String>,
}

impl LineageMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, rank: Rank, name: String) {
        self.entries.insert(rank, name);
    }

    pub fn get(&self, rank: Rank) -> Option<&str> {
        self.entries.get(&rank).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<const N: usize> From<[(Rank, &str); N]> for LineageMap {
    fn from(entries: [(Rank, &str); N]) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(rank, name)| (rank, name.to_string()))
                .collect(),
        }
    }
}

pub type Lineages = IndexMap<TaxonId, LineageMap>;

pub struct LineageBuilder<'a> {
    tree: &'a TaxonTree,
    records: &'a TaxonRecordStore,
    scheme: &'a RankScheme,
    sanitizer: &'a NameSanitizer,
}

impl<'a> LineageBuilder<'a> {
    pub fn new(
        tree: &'a TaxonTree,
        records: &'a TaxonRecordStore,
        scheme: &'a RankScheme,
        sanitizer: &'a NameSanitizer,
    ) -> Self {
        Self {
            tree,
            records,
            scheme,
            sanitizer,
        }
    }

    // With a repeated rank on one path the most distant ancestor wins.
    pub fn build(&self) -> Result<Lineages, TaxError> {
        let mut lineages = Lineages::new();
        for idx in self.tree.postorder() {
            if self.tree.is_root(idx) {
                continue;
            }
            let taxon_id = self.taxon_id(idx)?;
            let mut map = LineageMap::new();
            self.add_rank(&mut map, idx)?;
            for ancestor in self.tree.ancestors(idx) {
                if self.tree.is_root(ancestor) {
                    break;
                }
                self.add_rank(&mut map, ancestor)?;
            }
            lineages.insert(taxon_id, map);
        }
        debug!(lineages = lineages.len(), "built base lineages");
        Ok(lineages)
    }

    fn taxon_id(&self, idx: NodeIndex) -> Result<TaxonId, TaxError> {
        self.tree
            .label(idx)
            .map(TaxonId::new)
            .ok_or(TaxError::UnlabeledNode(idx))
    }

    fn add_rank(&self, map: &mut LineageMap, idx: NodeIndex) -> Result<(), TaxError> {
        let taxon_id = self.taxon_id(idx)?;
        let record = self
            .records
            .get(taxon_id.as_str())
            .ok_or_else(|| TaxError::UnknownTaxon(taxon_id.to_string()))?;
        if let Some(rank) = record.rank.filter(|rank| self.scheme.contains(*rank)) {
            map.insert(rank, self.sanitizer.sanitize(&record.raw_name));
        }
        Ok(())
    }
}
