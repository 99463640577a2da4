pub mod config;
mod orchestrator;
mod types;

pub use config::AnalysisConfig;
pub use orchestrator::{
    analyze_batch, analyze_batch_reported, analyze_contact_angles, analyze_tension_batch,
    analyze_tension_batch_reported,
};
pub use types::{AnalysisStage, ContactAngleRow, FrameReport, ProgressReporter};
