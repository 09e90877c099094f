pub mod source;
pub mod store;

pub use source::{CounterSource, DisableMarker, SourceError, TimestampSource};
pub use store::{StateLock, StateStore, StoreError};
