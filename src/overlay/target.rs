use image::{ImageResult, RgbaImage};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Mutable RGBA8 drawing surface handed out by a presentation target.
pub struct Canvas<'a> {
    pixels: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> Canvas<'a> {
    /// Wrap a row-major RGBA8 buffer of `width * height * 4` bytes.
    pub fn new(pixels: &'a mut [u8], width: u32, height: u32) -> Self {
        debug_assert_eq!(pixels.len(), width as usize * height as usize * 4);
        Self {
            pixels,
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut *self.pixels
    }

    /// Fill a rectangle, clipped to the canvas.
    pub fn fill_rect(&mut self, x: i64, y: i64, w: i64, h: i64, color: [u8; 4]) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + w).min(i64::from(self.width));
        let y1 = (y + h).min(i64::from(self.height));
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        let stride = self.width as usize * 4;
        for row in y0 as usize..y1 as usize {
            let line = &mut self.pixels[row * stride..(row + 1) * stride];
            for px in line[x0 as usize * 4..x1 as usize * 4].chunks_exact_mut(4) {
                px.copy_from_slice(&color);
            }
        }
    }
}

/// Where filtered frames end up.
pub trait PresentationTarget: Send {
    /// Run `draw` against the target's pixels.
    ///
    /// Returns `false` without calling `draw` when the target is not ready.
    fn with_canvas(&mut self, draw: &mut dyn FnMut(&mut Canvas<'_>)) -> bool;
}

/// In-memory target backed by an [`RgbaImage`].
///
/// Clones share the same surface, so a caller can keep a handle for
/// inspection or export after giving one to the pipeline.
#[derive(Clone)]
pub struct ImageTarget {
    image: Arc<Mutex<RgbaImage>>,
    ready: Arc<AtomicBool>,
    presented: Arc<AtomicU64>,
}

impl ImageTarget {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: Arc::new(Mutex::new(RgbaImage::new(width, height))),
            ready: Arc::new(AtomicBool::new(true)),
            presented: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Mark the surface available or unavailable for drawing.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Number of frames drawn so far.
    pub fn presented_count(&self) -> u64 {
        self.presented.load(Ordering::Relaxed)
    }

    /// Copy of the current surface contents.
    pub fn snapshot(&self) -> RgbaImage {
        self.image.lock().clone()
    }

    /// Write the current surface to an image file (format from the extension).
    pub fn save(&self, path: &Path) -> ImageResult<()> {
        self.image.lock().save(path)
    }
}

impl PresentationTarget for ImageTarget {
    fn with_canvas(&mut self, draw: &mut dyn FnMut(&mut Canvas<'_>)) -> bool {
        if !self.is_ready() {
            return false;
        }
        let mut image = self.image.lock();
        let (width, height) = image.dimensions();
        let mut canvas = Canvas::new(&mut **image, width, height);
        draw(&mut canvas);
        self.presented.fetch_add(1, Ordering::Relaxed);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_rect_clips_to_bounds() {
        let mut pixels = vec![0u8; 3 * 2 * 4];
        let mut canvas = Canvas::new(&mut pixels, 3, 2);
        canvas.fill_rect(-5, 1, 7, 10, [1, 2, 3, 4]);
        // row 0 untouched, row 1 columns 0 and 1 filled, column 2 untouched
        assert!(pixels[..12].iter().all(|&b| b == 0));
        assert_eq!(&pixels[12..20], &[1, 2, 3, 4, 1, 2, 3, 4]);
        assert_eq!(&pixels[20..24], &[0, 0, 0, 0]);
    }

    #[test]
    fn fill_rect_fully_outside_is_noop() {
        let mut pixels = vec![0u8; 2 * 2 * 4];
        let mut canvas = Canvas::new(&mut pixels, 2, 2);
        canvas.fill_rect(5, 5, 2, 2, [9, 9, 9, 9]);
        canvas.fill_rect(-3, 0, 2, 2, [9, 9, 9, 9]);
        assert!(pixels.iter().all(|&b| b == 0));
    }

    #[test]
    fn image_target_draws_when_ready() {
        let mut target = ImageTarget::new(2, 2);
        let drawn = target.with_canvas(&mut |canvas| canvas.fill_rect(0, 0, 1, 1, [7, 7, 7, 255]));
        assert!(drawn);
        assert_eq!(target.presented_count(), 1);
        assert_eq!(target.snapshot().get_pixel(0, 0).0, [7, 7, 7, 255]);
    }

    #[test]
    fn image_target_skips_when_not_ready() {
        let mut target = ImageTarget::new(2, 2);
        target.set_ready(false);
        let mut called = false;
        let drawn = target.with_canvas(&mut |_| called = true);
        assert!(!drawn);
        assert!(!called);
        assert_eq!(target.presented_count(), 0);
    }

    #[test]
    fn image_target_clones_share_surface() {
        let target = ImageTarget::new(1, 1);
        let mut writer = target.clone();
        writer.with_canvas(&mut |canvas| canvas.fill_rect(0, 0, 1, 1, [1, 2, 3, 4]));
        assert_eq!(target.snapshot().get_pixel(0, 0).0, [1, 2, 3, 4]);
    }

    #[test]
    fn image_target_saves_png() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("frame.png");
        let target = ImageTarget::new(3, 2);
        target.save(&path).unwrap();
        let loaded = image::open(&path).unwrap();
        assert_eq!((loaded.width(), loaded.height()), (3, 2));
    }
}
