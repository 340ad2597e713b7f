use serde::{Deserialize, Serialize};
use std::fmt;

use crate::filter::error::{BufferRole, FilterError, Result};

/// Bytes per pixel of a [`FilteredImage`].
pub const RGBA_BYTES: usize = 4;

/// Raw frame layout delivered by the frame source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// YUV 4:2:0 semi-planar: full-size Y plane, then interleaved V/U pairs.
    #[default]
    Nv21,
}

impl SourceFormat {
    /// Size in bytes of one frame at the given dimensions.
    ///
    /// Odd dimensions round the chroma grid up, so every 2x2 luma block
    /// (including partial blocks on the right and bottom edge) owns one V/U pair.
    pub fn frame_len(&self, width: u32, height: u32) -> usize {
        match self {
            SourceFormat::Nv21 => {
                let luma = width as usize * height as usize;
                luma + Self::chroma_stride(width) * height.div_ceil(2) as usize
            }
        }
    }

    /// Bytes per row of the interleaved chroma plane.
    pub fn chroma_stride(width: u32) -> usize {
        width.div_ceil(2) as usize * 2
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFormat::Nv21 => write!(f, "NV21 (YUV 4:2:0 semi-planar, VU)"),
        }
    }
}

/// Which filter the pipeline applies to each frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterSelector {
    #[default]
    PassthroughConvert,
    Laplacian,
    Gaussian,
}

impl FilterSelector {
    pub const ALL: [FilterSelector; 3] = [
        FilterSelector::PassthroughConvert,
        FilterSelector::Laplacian,
        FilterSelector::Gaussian,
    ];

    /// Numeric choice used by selection controls (0, 1, 2).
    pub fn index(self) -> u8 {
        match self {
            FilterSelector::PassthroughConvert => 0,
            FilterSelector::Laplacian => 1,
            FilterSelector::Gaussian => 2,
        }
    }

    pub fn from_index(index: u8) -> Result<Self> {
        match index {
            0 => Ok(FilterSelector::PassthroughConvert),
            1 => Ok(FilterSelector::Laplacian),
            2 => Ok(FilterSelector::Gaussian),
            other => Err(FilterError::UnsupportedSelector(other)),
        }
    }

    /// Overlay label drawn over frames produced by this filter.
    pub fn label(self) -> &'static str {
        match self {
            FilterSelector::PassthroughConvert => "RGBA",
            FilterSelector::Laplacian => "Laplacian",
            FilterSelector::Gaussian => "Gaussian",
        }
    }

    /// The selector following this one, wrapping around.
    pub fn next(self) -> Self {
        Self::ALL[(self.index() as usize + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for FilterSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Borrowed view over one captured frame.
///
/// The backing storage belongs to the frame source and is reused for the
/// next frame, so nothing here may outlive a single delivery.
#[derive(Debug, Clone, Copy)]
pub struct RawFrame<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
    format: SourceFormat,
}

impl<'a> RawFrame<'a> {
    pub fn new(data: &'a [u8], width: u32, height: u32, format: SourceFormat) -> Self {
        Self {
            data,
            width,
            height,
            format,
        }
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> SourceFormat {
        self.format
    }

    /// Full-resolution luma plane.
    pub fn luma(&self) -> &'a [u8] {
        &self.data[..self.width as usize * self.height as usize]
    }

    /// Interleaved chroma plane following the luma plane.
    pub fn chroma(&self) -> &'a [u8] {
        let luma_len = self.width as usize * self.height as usize;
        &self.data[luma_len..self.format.frame_len(self.width, self.height)]
    }

    /// Fails unless the view holds a complete frame for its dimensions.
    pub fn validate(&self) -> Result<()> {
        let expected = self.format.frame_len(self.width, self.height);
        if self.data.len() < expected {
            return Err(FilterError::DimensionMismatch {
                role: BufferRole::Input,
                expected,
                actual: self.data.len(),
            });
        }
        Ok(())
    }
}

/// RGBA8 output image, reused in place across frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredImage {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    filter: Option<FilterSelector>,
}

impl FilteredImage {
    /// Allocate a black, fully transparent image.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: vec![0; width as usize * height as usize * RGBA_BYTES],
            width,
            height,
            filter: None,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// RGBA pixel at (x, y).
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = (y as usize * self.width as usize + x as usize) * RGBA_BYTES;
        let mut px = [0u8; 4];
        px.copy_from_slice(&self.pixels[idx..idx + RGBA_BYTES]);
        px
    }

    /// Filter that produced the current contents, if any frame was written.
    pub fn filter(&self) -> Option<FilterSelector> {
        self.filter
    }

    pub fn set_filter(&mut self, filter: FilterSelector) {
        self.filter = Some(filter);
    }

    /// Fails unless this image can hold an RGBA frame of the given size.
    pub fn check_dimensions(&self, width: u32, height: u32) -> Result<()> {
        let expected = width as usize * height as usize * RGBA_BYTES;
        if self.width != width || self.height != height || self.pixels.len() != expected {
            return Err(FilterError::DimensionMismatch {
                role: BufferRole::Output,
                expected,
                actual: self.pixels.len(),
            });
        }
        Ok(())
    }
}
