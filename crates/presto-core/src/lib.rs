//! Presto Core - streaming time/pitch-stretch adapter
//!
//! Sits inside a host playback pipeline and transforms interleaved PCM
//! chunks through a stretch engine while keeping the host's chunk protocol
//! stable: mid-stream format changes, engine warm-up, and backend failures
//! are absorbed here and never surface as errors. One processor instance
//! drives one stream, single input to single output.

pub mod codec;
pub mod config;
pub mod control;
pub mod engine;
pub mod processor;
pub mod types;

pub use config::StretchConfig;
pub use control::{PresetListener, StretchControl};
pub use engine::{EngineError, EngineFactory, SignalsmithEngine, SignalsmithFactory, StretchEngine};
pub use processor::StretchProcessor;
pub use types::*;
