//! Presentation layer: an ordered collection of result slots.
//!
//! The dispatcher and executors only talk to the [`Presentation`] trait. The
//! in-memory [`SlotBoard`] keeps the slots in display order and broadcasts a
//! [`BoardEvent`] for every change so a renderer can redraw incrementally.

use metrics::counter;
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::broadcast;

use crate::domain::descriptor::{Generation, SlotId};
use crate::domain::slot::AnySlot;
use crate::metrics::STALE_UPDATES_TOTAL;

/// Default capacity of the board's event channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Reference to a slot attached to a presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SlotHandle {
    /// Generation the slot was created in
    pub generation: Generation,
    /// Display position within its batch
    pub position: usize,
    pub id: SlotId,
}

/// Result of writing to a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotUpdate {
    /// The write replaced the slot's contents
    Applied,
    /// The slot belongs to a batch that has since been cleared; write dropped
    Stale,
    /// The slot already holds a terminal state; write dropped
    AlreadyFinal,
    /// No slot with this id exists in the current generation
    Unknown,
}

/// Change notification emitted by a [`SlotBoard`].
#[derive(Debug, Clone)]
pub enum BoardEvent {
    Created {
        generation: Generation,
        position: usize,
        slot: AnySlot,
    },
    Updated {
        generation: Generation,
        position: usize,
        slot: AnySlot,
    },
    Cleared {
        generation: Generation,
    },
}

/// The collaborator slots are rendered into.
pub trait Presentation: Send + Sync {
    /// Attach a slot at `position`, keeping slots ordered by position.
    fn create_slot(&self, position: usize, slot: AnySlot) -> SlotHandle;

    /// Replace the contents of a previously created slot.
    fn update_slot(&self, handle: SlotHandle, slot: AnySlot) -> SlotUpdate;

    /// Drop every slot and start a new generation, returning it.
    fn clear_all(&self) -> Generation;

    /// The current generation.
    fn generation(&self) -> Generation;

    /// The current slots in display order.
    fn snapshot(&self) -> Vec<AnySlot>;
}

struct BoardState {
    generation: Generation,
    slots: Vec<AnySlot>,
}

/// In-memory presentation with change notifications.
pub struct SlotBoard {
    state: Mutex<BoardState>,
    events: broadcast::Sender<BoardEvent>,
}

impl SlotBoard {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }

    /// Board whose event channel buffers up to `capacity` events per subscriber.
    pub fn with_capacity(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity.max(1));
        Self {
            state: Mutex::new(BoardState {
                generation: Generation::default(),
                slots: Vec::new(),
            }),
            events,
        }
    }

    /// Subscribe to change events. Only events sent after this call are received.
    pub fn subscribe(&self) -> broadcast::Receiver<BoardEvent> {
        self.events.subscribe()
    }

    pub fn len(&self) -> usize {
        self.state.lock().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn emit(&self, event: BoardEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

impl Default for SlotBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl Presentation for SlotBoard {
    fn create_slot(&self, position: usize, slot: AnySlot) -> SlotHandle {
        let mut state = self.state.lock();
        let handle = SlotHandle {
            generation: state.generation,
            position,
            id: slot.id(),
        };

        let index = state.slots.partition_point(|s| s.position() <= position);
        state.slots.insert(index, slot.clone());

        self.emit(BoardEvent::Created {
            generation: handle.generation,
            position,
            slot,
        });
        handle
    }

    fn update_slot(&self, handle: SlotHandle, slot: AnySlot) -> SlotUpdate {
        let mut state = self.state.lock();

        if handle.generation != state.generation {
            counter!(STALE_UPDATES_TOTAL).increment(1);
            tracing::debug!(
                slot_id = %handle.id,
                slot_generation = %handle.generation,
                current_generation = %state.generation,
                "Discarding update for a slot from a cleared batch"
            );
            return SlotUpdate::Stale;
        }

        let Some(existing) = state.slots.iter_mut().find(|s| s.id() == handle.id) else {
            tracing::warn!(slot_id = %handle.id, "Update for unknown slot");
            return SlotUpdate::Unknown;
        };

        if existing.is_terminal() {
            tracing::warn!(
                slot_id = %handle.id,
                state = %existing.state(),
                "Slot already finalized, ignoring second write"
            );
            return SlotUpdate::AlreadyFinal;
        }

        *existing = slot.clone();
        self.emit(BoardEvent::Updated {
            generation: handle.generation,
            position: handle.position,
            slot,
        });
        SlotUpdate::Applied
    }

    fn clear_all(&self) -> Generation {
        let mut state = self.state.lock();
        state.slots.clear();
        state.generation = state.generation.next();

        tracing::debug!(generation = %state.generation, "Board cleared");
        self.emit(BoardEvent::Cleared {
            generation: state.generation,
        });
        state.generation
    }

    fn generation(&self) -> Generation {
        self.state.lock().generation
    }

    fn snapshot(&self) -> Vec<AnySlot> {
        self.state.lock().slots.clone()
    }
}
