//! Scheduled future actions.
//!
//! Replaces coroutine-style "wait then continue" flows with explicit
//! records in a min-heap keyed by sim-time. An action owned by an
//! entity is silently dropped if that entity is despawned before the
//! action fires.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use astroblitz_core::enums::ActionTarget;
use astroblitz_core::templates::ItemAction;

/// What a scheduled action does when it fires.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionKind {
    /// Despawn the owning entity (corpse removal, shot expiry, item
    /// fade-out).
    RemoveEntity,
    /// Execute a delayed item effect.
    ItemEffect {
        target: ActionTarget,
        action: ItemAction,
    },
    /// Enter the terminal victory/defeat phase.
    EndMission { victory: bool },
}

/// One pending action.
#[derive(Debug, Clone)]
pub struct ScheduledAction {
    /// Sim-time (seconds) at which the action fires.
    pub fire_at: f64,
    /// Insertion order, used as a tiebreaker so equal fire times pop
    /// in FIFO order.
    seq: u64,
    /// Cancellation anchor: the action is dropped if this entity is
    /// gone when it fires.
    pub owner: Option<hecs::Entity>,
    pub kind: ActionKind,
}

impl PartialEq for ScheduledAction {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl Eq for ScheduledAction {}

impl PartialOrd for ScheduledAction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledAction {
    // Reversed so the BinaryHeap pops the earliest fire time first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .fire_at
            .total_cmp(&self.fire_at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-heap of pending actions.
#[derive(Debug, Default)]
pub struct ActionQueue {
    heap: BinaryHeap<ScheduledAction>,
    next_seq: u64,
}

impl ActionQueue {
    /// Schedule an action at an absolute sim-time.
    pub fn schedule(&mut self, fire_at: f64, owner: Option<hecs::Entity>, kind: ActionKind) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(ScheduledAction {
            fire_at,
            seq,
            owner,
            kind,
        });
    }

    /// Pop the next action due at or before `now`, if any.
    pub fn pop_due(&mut self, now: f64) -> Option<ScheduledAction> {
        if self.heap.peek()?.fire_at <= now {
            self.heap.pop()
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
