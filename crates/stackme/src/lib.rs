/// Bounded undo/redo history for arbitrary application states.
///
/// Provides a `HistoryStack` holding opaque snapshots behind a movable
/// cursor. A push policy decides what happens to the redo branch when a new
/// snapshot is pushed after an undo, and a capacity bound evicts the oldest
/// snapshots. Stacks can be exported to and rehydrated from a plain record.
pub mod config;
pub mod lookup;
pub mod policy;
pub mod snapshot;
pub mod stack;

pub use config::StackConfig;
pub use lookup::Lookup;
pub use policy::Policy;
pub use snapshot::StackSnapshot;
pub use stack::HistoryStack;
