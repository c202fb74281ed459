//! Local-first synchronization between the cache and the remote store.

mod clock;
mod facade;
#[cfg(test)]
pub(crate) mod testing;

pub use clock::{Clock, ManualClock, SystemClock};
pub use facade::{Connectivity, SyncFacade};
