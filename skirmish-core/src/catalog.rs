use std::collections::{HashMap, HashSet};

use crate::error::StoreError;
use crate::items::{ItemId, ItemKind, ItemSpot};
use crate::store::MapKnowledgeStore;
use crate::world::ItemCatalog;

/// Pickup points learned while playing a map.
///
/// Items are remembered the first time they are seen and survive across
/// matches through a [`MapKnowledgeStore`]. Spawn state is live information
/// and is never persisted; a remembered item counts as spawned until the host
/// reports otherwise.
#[derive(Clone, Debug, Default)]
pub struct ItemRegistry {
    spots: Vec<ItemSpot>,
    index: HashMap<ItemId, usize>,
    despawned: HashSet<ItemId>,
}

impl ItemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_spots(spots: impl IntoIterator<Item = ItemSpot>) -> Self {
        let mut registry = Self::new();
        for spot in spots {
            registry.observe(spot);
        }
        registry
    }

    pub fn load(map: &str, store: &dyn MapKnowledgeStore) -> Result<Self, StoreError> {
        let registry = Self::from_spots(store.load_items(map)?);
        tracing::debug!(map, items = registry.len(), "item registry loaded");
        Ok(registry)
    }

    pub fn save(&self, map: &str, store: &dyn MapKnowledgeStore) -> Result<(), StoreError> {
        store.store_items(map, &self.spots)
    }

    /// Returns true when the item was not known before. Unrecognised kinds
    /// are ignored.
    pub fn observe(&mut self, spot: ItemSpot) -> bool {
        if spot.kind == ItemKind::Unknown || self.index.contains_key(&spot.id) {
            return false;
        }
        self.index.insert(spot.id.clone(), self.spots.len());
        self.spots.push(spot);
        true
    }

    pub fn set_spawned(&mut self, id: &ItemId, spawned: bool) {
        if spawned {
            self.despawned.remove(id);
        } else if self.index.contains_key(id) {
            self.despawned.insert(id.clone());
        }
    }

    pub fn get(&self, id: &ItemId) -> Option<&ItemSpot> {
        self.index.get(id).map(|&i| &self.spots[i])
    }

    pub fn len(&self) -> usize {
        self.spots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spots.is_empty()
    }
}

impl ItemCatalog for ItemRegistry {
    fn known_items(&self) -> &[ItemSpot] {
        &self.spots
    }

    fn is_spawned(&self, id: &ItemId) -> bool {
        self.index.contains_key(id) && !self.despawned.contains(id)
    }
}
