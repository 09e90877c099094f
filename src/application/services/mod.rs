pub mod engine;

pub use engine::ThresholdEngine;
