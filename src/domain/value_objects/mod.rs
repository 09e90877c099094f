pub mod severity;
pub mod state_key;
pub mod thresholds;

pub use severity::Severity;
pub use state_key::StateKey;
pub use thresholds::Thresholds;
