// ── Data store ──
//
// Snapshot-published state plus the bookkeeping the controller needs to
// decide which responses may still be applied.

mod data_store;
pub(crate) mod sequence;

pub(crate) use data_store::Publication;
pub use data_store::{Collection, DataStore, LoadStatus};
