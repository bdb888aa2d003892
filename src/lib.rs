// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod aggregate;
pub mod config;
pub mod decide;
pub mod geo;
pub mod geocode;
pub mod lookup;
pub mod rank;
pub mod rarity;
pub mod scheduler;
pub mod snapshot;
pub mod spawn;

// Notification transport
pub mod notify;

// ---- Re-exports for stable public API ----
pub use crate::decide::{NotificationEvent, NotificationLedger};
pub use crate::geo::Coordinate;
pub use crate::notify::{Notifier, SlackNotifier};
pub use crate::spawn::{RawObservation, Spawn, SpawnSet};
