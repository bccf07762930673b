//! Host notifications, buffered until the next tick.
//!
//! Perception and game callbacks may arrive on any thread. They are pushed
//! through an [`EventSender`] and applied by the agent at the start of its
//! tick, so belief and state-machine scratch only ever see one writer.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::geometry::Location;
use crate::items::{ItemId, ItemKind, ItemSpot};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum AgentEvent {
    EnemySeen {
        name: String,
        location: Location,
        weapon: Option<String>,
    },
    EnemyUpdated {
        location: Location,
        weapon: Option<String>,
    },
    EnemyLost,
    /// A projectile class (`XWeapons.ShockProjectile`, ...) is in flight.
    IncomingProjectile {
        class_name: String,
        location: Location,
    },
    /// `direct` is false for splash and environmental damage.
    DamageTaken { amount: u32, direct: bool },
    DamageDealt { amount: u32, damage_type: String },
    /// Yaw in degrees, relative to the world axes.
    NoiseHeard { yaw: f64 },
    PickupHeard {
        kind: ItemKind,
        location: Location,
        yaw: f64,
    },
    ItemSeen(ItemSpot),
    ItemTaken { id: ItemId },
    ItemSpawned { id: ItemId },
    Killed,
    Died,
    OpponentJoined { name: String },
    OpponentLeft,
    DestinationReached,
    Stuck,
}

type Shared = Arc<Mutex<VecDeque<AgentEvent>>>;

fn lock(queue: &Shared) -> MutexGuard<'_, VecDeque<AgentEvent>> {
    // A panicking producer cannot leave the deque half-written.
    queue.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Single-consumer event buffer owned by the agent.
#[derive(Debug, Default)]
pub struct EventQueue {
    inner: Shared,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sender(&self) -> EventSender {
        EventSender {
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn push(&self, event: AgentEvent) {
        lock(&self.inner).push_back(event);
    }

    /// Everything queued so far, oldest first.
    pub fn drain(&self) -> Vec<AgentEvent> {
        lock(&self.inner).drain(..).collect()
    }

    pub fn len(&self) -> usize {
        lock(&self.inner).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.inner).is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct EventSender {
    inner: Shared,
}

impl EventSender {
    pub fn send(&self, event: AgentEvent) {
        lock(&self.inner).push_back(event);
    }
}
