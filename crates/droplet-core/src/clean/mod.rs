pub mod cleaner;
pub mod config;
pub mod dbscan;
pub mod ordering;
pub mod profile;

pub use cleaner::clean;
pub use config::CleanConfig;
pub use profile::{ApexFrame, CleanedProfile, ContactPoints, HalfProfile};
