mod accumulator;
mod config;
mod steinhardt;

pub use accumulator::HarmonicArena;
pub use config::SteinhardtConfig;
pub use steinhardt::Steinhardt;
