//! In-memory pillar cache.
//!
//! Refreshed wholesale by the cached-state syncer; read by the momentum
//! processor and the vote/delegation paths. The writer builds a complete
//! replacement value and swaps it in under the write lock, so readers never
//! observe a half-rebuilt map.

use crate::models::Pillar;
use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
pub struct PillarCache {
    pillars: Vec<Pillar>,
    name_to_owner: HashMap<String, String>,
}

impl PillarCache {
    pub fn new(pillars: Vec<Pillar>) -> Self {
        let name_to_owner = pillars
            .iter()
            .map(|p| (p.name.clone(), p.owner_address.clone()))
            .collect();
        Self {
            pillars,
            name_to_owner,
        }
    }

    /// Owner address for a pillar name, empty when unknown.
    pub fn owner_of(&self, name: &str) -> String {
        self.name_to_owner.get(name).cloned().unwrap_or_default()
    }

    pub fn snapshot(&self) -> Vec<Pillar> {
        self.pillars.clone()
    }

    pub fn len(&self) -> usize {
        self.pillars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pillars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pillar(name: &str, owner: &str) -> Pillar {
        Pillar {
            name: name.to_string(),
            owner_address: owner.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn owner_lookup() {
        let cache = PillarCache::new(vec![pillar("alpha", "z1owner1"), pillar("beta", "z1owner2")]);
        assert_eq!(cache.owner_of("alpha"), "z1owner1");
        assert_eq!(cache.owner_of("beta"), "z1owner2");
        assert_eq!(cache.owner_of("missing"), "");
    }

    #[test]
    fn every_owner_is_in_the_snapshot() {
        let cache = PillarCache::new(vec![pillar("alpha", "z1owner1"), pillar("beta", "z1owner2")]);
        for p in cache.snapshot() {
            assert_eq!(cache.owner_of(&p.name), p.owner_address);
        }
    }

    #[test]
    fn empty_cache() {
        let cache = PillarCache::default();
        assert!(cache.is_empty());
        assert_eq!(cache.owner_of("anything"), "");
    }
}
