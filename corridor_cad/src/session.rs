//! Explicit editing context holding corridors behind generational ids.

use slotmap::{new_key_type, SlotMap};

use crate::corridor::Corridor;

new_key_type! {
    /// Handle to a corridor stored in a [`Session`].
    ///
    /// Ids of removed corridors never resolve again, even after their slot is reused.
    pub struct CorridorId;
}

/// Owner of every corridor being edited.
#[derive(Debug, Clone, Default)]
pub struct Session {
    corridors: SlotMap<CorridorId, Corridor>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, corridor: Corridor) -> CorridorId {
        self.corridors.insert(corridor)
    }

    pub fn get(&self, id: CorridorId) -> Option<&Corridor> {
        self.corridors.get(id)
    }

    pub fn get_mut(&mut self, id: CorridorId) -> Option<&mut Corridor> {
        self.corridors.get_mut(id)
    }

    /// Removes a corridor; its id and every copy of it become stale.
    pub fn remove(&mut self, id: CorridorId) -> Option<Corridor> {
        self.corridors.remove(id)
    }

    pub fn contains(&self, id: CorridorId) -> bool {
        self.corridors.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CorridorId, &Corridor)> {
        self.corridors.iter()
    }

    pub fn len(&self) -> usize {
        self.corridors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.corridors.is_empty()
    }
}
