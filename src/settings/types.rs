use serde::{Deserialize, Serialize};

use crate::filter::types::FilterSelector;
use crate::overlay::renderer::OverlayStyle;
use crate::preview::pipeline::DEFAULT_FAILURE_THRESHOLD;
use crate::preview::types::CaptureConfig;

/// Top-level settings file. Missing fields fall back to their defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PreviewSettings {
    pub capture: CaptureConfig,
    pub overlay: OverlayStyle,
    /// Filter selected when the preview starts.
    pub filter: FilterSelector,
    /// Consecutive filter failures before frames report an error.
    pub failure_threshold: u32,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            capture: CaptureConfig::default(),
            overlay: OverlayStyle::default(),
            filter: FilterSelector::default(),
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
        }
    }
}
