use serde::{Deserialize, Serialize};
use std::fmt;

use crate::filter::types::{FilterSelector, SourceFormat};
use crate::preview::error::ConfigError;

/// Capture parameters fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CaptureConfig {
    pub width: u32,
    pub height: u32,
    pub format: SourceFormat,
    /// Lower frame-rate bound requested from the source, in frames per second.
    pub min_fps: u32,
    /// Upper frame-rate bound requested from the source, in frames per second.
    pub max_fps: u32,
}

impl CaptureConfig {
    pub fn new(width: u32, height: u32, format: SourceFormat) -> Self {
        Self {
            width,
            height,
            format,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.min_fps == 0 || self.min_fps > self.max_fps {
            return Err(ConfigError::InvalidFpsRange {
                min: self.min_fps,
                max: self.max_fps,
            });
        }
        Ok(())
    }

    /// Bytes in one raw frame.
    pub fn frame_len(&self) -> usize {
        self.format.frame_len(self.width, self.height)
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            format: SourceFormat::Nv21,
            min_fps: 15,
            max_fps: 30,
        }
    }
}

/// Lifecycle state of a [`PreviewPipeline`](crate::preview::pipeline::PreviewPipeline).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Uninitialized,
    Configured,
    Streaming,
    Stopped,
}

impl PipelineState {
    pub(crate) fn as_u8(self) -> u8 {
        match self {
            PipelineState::Uninitialized => 0,
            PipelineState::Configured => 1,
            PipelineState::Streaming => 2,
            PipelineState::Stopped => 3,
        }
    }

    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            1 => PipelineState::Configured,
            2 => PipelineState::Streaming,
            3 => PipelineState::Stopped,
            _ => PipelineState::Uninitialized,
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Uninitialized => "uninitialized",
            PipelineState::Configured => "configured",
            PipelineState::Streaming => "streaming",
            PipelineState::Stopped => "stopped",
        };
        write!(f, "{name}")
    }
}

/// Why a delivered frame was not presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Another frame was still being filtered.
    Busy,
    /// The filter rejected the frame.
    FilterFailed,
    /// The source had no new frame to hand over.
    NoFrame,
}

/// Result of one frame delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Presented {
        sequence: u64,
        filter: FilterSelector,
    },
    Dropped(DropReason),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_vga_nv21() {
        let config = CaptureConfig::default();
        assert_eq!((config.width, config.height), (640, 480));
        assert_eq!(config.format, SourceFormat::Nv21);
        assert!(config.validate().is_ok());
        assert_eq!(config.frame_len(), 640 * 480 * 3 / 2);
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        let config = CaptureConfig::new(0, 480, SourceFormat::Nv21);
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidDimensions {
                width: 0,
                height: 480
            })
        );
        assert!(CaptureConfig::new(640, 0, SourceFormat::Nv21)
            .validate()
            .is_err());
    }

    #[test]
    fn inverted_fps_range_is_rejected() {
        let config = CaptureConfig {
            min_fps: 30,
            max_fps: 15,
            ..CaptureConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidFpsRange { min: 30, max: 15 })
        );
    }

    #[test]
    fn pipeline_state_survives_atomic_encoding() {
        for state in [
            PipelineState::Uninitialized,
            PipelineState::Configured,
            PipelineState::Streaming,
            PipelineState::Stopped,
        ] {
            assert_eq!(PipelineState::from_u8(state.as_u8()), state);
        }
    }

    #[test]
    fn config_deserialises_with_defaults_for_missing_fields() {
        let config: CaptureConfig = serde_json::from_str(r#"{"width": 4, "height": 4}"#).unwrap();
        assert_eq!(config.width, 4);
        assert_eq!(config.min_fps, 15);
        assert_eq!(config.format, SourceFormat::Nv21);
    }
}
