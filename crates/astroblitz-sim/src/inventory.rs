//! Item inventory: a fixed row of slots the player can stash pickups in.

/// Inventory slots; each holds an item template index or nothing.
#[derive(Debug, Clone)]
pub struct Inventory {
    slots: Vec<Option<usize>>,
}

impl Inventory {
    pub fn new(slot_count: usize) -> Self {
        Self {
            slots: vec![None; slot_count],
        }
    }

    /// Place an item in the first empty slot. Returns false when the
    /// inventory is full (the caller then uses the item immediately).
    pub fn store(&mut self, item_template: usize) -> bool {
        for slot in &mut self.slots {
            if slot.is_none() {
                *slot = Some(item_template);
                return true;
            }
        }
        false
    }

    /// Take the item out of a slot. Out-of-range or empty slots yield
    /// nothing.
    pub fn take(&mut self, slot: usize) -> Option<usize> {
        self.slots.get_mut(slot)?.take()
    }

    pub fn slots(&self) -> &[Option<usize>] {
        &self.slots
    }
}
