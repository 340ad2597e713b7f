use fast_image_resize as fr;
use fr::images::{Image, ImageRef};
use serde::{Deserialize, Serialize};

use crate::filter::types::FilteredImage;
use crate::overlay::font;
use crate::overlay::target::{Canvas, PresentationTarget};

/// Label placement and appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OverlayStyle {
    /// Cap height of the label in pixels.
    pub text_size: u32,
    /// Label colour as 0xAARRGGBB.
    pub color: u32,
    /// Left edge of the label.
    pub anchor_x: i64,
    /// Baseline of the label.
    pub anchor_y: i64,
}

impl OverlayStyle {
    /// Colour as `[r, g, b, a]`.
    pub fn rgba(&self) -> [u8; 4] {
        let [a, r, g, b] = self.color.to_be_bytes();
        [r, g, b, a]
    }
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            text_size: 64,
            color: 0xFFFF_0000,
            anchor_x: 64,
            anchor_y: 64,
        }
    }
}

/// Composites filtered frames and their label onto a presentation target.
///
/// Frames are scaled with nearest-neighbour sampling, matching an unfiltered
/// bitmap draw.
pub struct OverlayRenderer {
    style: OverlayStyle,
    resizer: fr::Resizer,
    options: fr::ResizeOptions,
}

impl OverlayRenderer {
    pub fn new(style: OverlayStyle) -> Self {
        Self {
            style,
            resizer: fr::Resizer::new(),
            options: fr::ResizeOptions::new().resize_alg(fr::ResizeAlg::Nearest),
        }
    }

    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    /// Draw `image` stretched over the whole target, then `label` on top.
    ///
    /// Returns whether anything was drawn; an unready target is skipped.
    pub fn present(
        &mut self,
        target: &mut dyn PresentationTarget,
        image: &FilteredImage,
        label: &str,
    ) -> bool {
        let style = self.style;
        let resizer = &mut self.resizer;
        let options = &self.options;
        target.with_canvas(&mut |canvas| {
            blit(resizer, options, image, canvas);
            font::draw_text(
                canvas,
                style.anchor_x,
                style.anchor_y,
                label,
                style.rgba(),
                font::scale_for(style.text_size),
            );
        })
    }
}

impl Default for OverlayRenderer {
    fn default() -> Self {
        Self::new(OverlayStyle::default())
    }
}

/// Copy `image` into `canvas`, resampling when the sizes differ.
fn blit(
    resizer: &mut fr::Resizer,
    options: &fr::ResizeOptions,
    image: &FilteredImage,
    canvas: &mut Canvas<'_>,
) {
    if canvas.width() == 0 || canvas.height() == 0 || image.width() == 0 || image.height() == 0 {
        return;
    }
    if canvas.width() == image.width() && canvas.height() == image.height() {
        canvas.pixels_mut().copy_from_slice(image.pixels());
        return;
    }

    let (width, height) = (canvas.width(), canvas.height());
    let src = match ImageRef::new(image.width(), image.height(), image.pixels(), fr::PixelType::U8x4) {
        Ok(src) => src,
        Err(e) => {
            tracing::warn!("overlay: invalid source image: {e}");
            return;
        }
    };
    let mut dst = match Image::from_slice_u8(width, height, canvas.pixels_mut(), fr::PixelType::U8x4) {
        Ok(dst) => dst,
        Err(e) => {
            tracing::warn!("overlay: invalid target canvas: {e}");
            return;
        }
    };
    if let Err(e) = resizer.resize(&src, &mut dst, options) {
        tracing::warn!("overlay: resize failed: {e}");
    }
}
