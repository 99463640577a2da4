use serde::{Deserialize, Serialize};

use crate::clean::CleanConfig;
use crate::fit::{ContactAngleMethod, FitConfig};
use crate::tensiometry::TensiometryConfig;

/// Top-level configuration for contact-angle and tensiometry analysis.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub clean: CleanConfig,
    /// Methods run on every frame, in report order.
    #[serde(default = "default_methods")]
    pub methods: Vec<ContactAngleMethod>,
    #[serde(default)]
    pub fit: FitConfig,
    #[serde(default)]
    pub tensiometry: TensiometryConfig,
}

fn default_methods() -> Vec<ContactAngleMethod> {
    ContactAngleMethod::ALL.to_vec()
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            clean: CleanConfig::default(),
            methods: default_methods(),
            fit: FitConfig::default(),
            tensiometry: TensiometryConfig::default(),
        }
    }
}
