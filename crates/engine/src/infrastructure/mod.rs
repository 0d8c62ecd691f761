//! External dependency implementations (ports + adapters).

pub mod fs_source;
pub mod ports;

pub use fs_source::FileScenarioSource;
pub use ports::{ClockPort, PreferenceSource, ScenarioSource, SourceError, SystemClock};
