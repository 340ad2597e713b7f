use crate::preview::error::SourceError;
use crate::preview::types::CaptureConfig;

/// Producer of raw frames.
///
/// The pipeline lends its pooled capture buffer to the source, which fills
/// it in place; the buffer comes back once the frame has been filtered.
pub trait FrameSource: Send {
    /// Human-readable name for logs.
    fn name(&self) -> &str;

    /// Write the next frame into `buffer` (exactly `config.frame_len()` bytes).
    ///
    /// Returns `Ok(false)` when no new frame is available yet.
    fn capture_into(
        &mut self,
        buffer: &mut [u8],
        config: &CaptureConfig,
    ) -> Result<bool, SourceError>;
}

/// A fake camera producing a scrolling NV21 test pattern.
///
/// Luma is a diagonal ramp shifted by `speed` per frame; chroma sweeps slowly
/// so the RGBA conversion has something to show.
pub struct SyntheticSource {
    frame: u64,
    speed: u8,
    limit: Option<u64>,
}

impl SyntheticSource {
    pub fn new() -> Self {
        Self {
            frame: 0,
            speed: 4,
            limit: None,
        }
    }

    /// Stop producing frames after `limit` captures.
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Number of frames produced so far.
    pub fn frames_produced(&self) -> u64 {
        self.frame
    }

    /// Render frame number `index` into `buffer`.
    pub fn render(index: u64, speed: u8, buffer: &mut [u8], config: &CaptureConfig) {
        let width = config.width as usize;
        let height = config.height as usize;
        if width == 0 || height == 0 {
            return;
        }
        let shift = (index as usize).wrapping_mul(speed as usize);
        let (luma, chroma) = buffer.split_at_mut(width * height);

        for (y, row) in luma.chunks_exact_mut(width).enumerate() {
            for (x, px) in row.iter_mut().enumerate() {
                *px = ((x + y + shift) & 0xff) as u8;
            }
        }

        let sweep = (index & 0xff) as u8;
        for (i, pair) in chroma.chunks_exact_mut(2).enumerate() {
            // V then U
            pair[0] = sweep.wrapping_add((i & 0x3f) as u8);
            pair[1] = 255u8.wrapping_sub(sweep);
        }
    }
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for SyntheticSource {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn capture_into(
        &mut self,
        buffer: &mut [u8],
        config: &CaptureConfig,
    ) -> Result<bool, SourceError> {
        if self.limit.is_some_and(|limit| self.frame >= limit) {
            return Ok(false);
        }
        if buffer.len() != config.frame_len() {
            return Err(SourceError::Capture {
                name: self.name().to_string(),
                message: format!(
                    "buffer holds {} bytes, frame needs {}",
                    buffer.len(),
                    config.frame_len()
                ),
            });
        }
        Self::render(self.frame, self.speed, buffer, config);
        self.frame += 1;
        Ok(true)
    }
}
