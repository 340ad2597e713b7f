//! Pixel filter domain: NV21 conversion and luma convolutions.
//!
//! Every filter writes into a caller-owned [`FilteredImage`] and performs no
//! allocation, so it is safe to run on the per-frame hot path.

pub mod convert;
pub mod error;
pub mod kernel;
pub mod types;

use crate::filter::error::Result;
use crate::filter::types::{FilterSelector, FilteredImage, RawFrame};

/// A frame filter stage.
///
/// Implementations must only write into `output` and must not retain `input`.
pub trait PixelFilter: Send + Sync {
    fn apply(
        &self,
        output: &mut FilteredImage,
        input: &RawFrame<'_>,
        selector: FilterSelector,
    ) -> Result<()>;
}

/// The statically linked filter set.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinFilter;

impl PixelFilter for BuiltinFilter {
    fn apply(
        &self,
        output: &mut FilteredImage,
        input: &RawFrame<'_>,
        selector: FilterSelector,
    ) -> Result<()> {
        input.validate()?;
        output.check_dimensions(input.width(), input.height())?;

        let width = input.width() as usize;
        let height = input.height() as usize;
        if width == 0 || height == 0 {
            output.set_filter(selector);
            return Ok(());
        }
        let pixels: &mut [[u8; 4]] = bytemuck::cast_slice_mut(output.pixels_mut());

        match selector {
            FilterSelector::PassthroughConvert => convert::nv21_to_rgba(input, pixels),
            FilterSelector::Laplacian => kernel::LAPLACIAN.apply(input.luma(), width, height, pixels),
            FilterSelector::Gaussian => kernel::GAUSSIAN.apply(input.luma(), width, height, pixels),
        }
        output.set_filter(selector);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::error::{BufferRole, FilterError};
    use crate::filter::types::SourceFormat;

    fn flat_nv21(width: u32, height: u32, luma: u8) -> Vec<u8> {
        let mut data = vec![luma; (width * height) as usize];
        data.resize(SourceFormat::Nv21.frame_len(width, height), 128);
        data
    }

    fn filter(data: &[u8], width: u32, height: u32, selector: FilterSelector) -> FilteredImage {
        let mut out = FilteredImage::new(width, height);
        let frame = RawFrame::new(data, width, height, SourceFormat::Nv21);
        BuiltinFilter.apply(&mut out, &frame, selector).unwrap();
        out
    }

    #[test]
    fn passthrough_of_uniform_luma_is_uniform_opaque_grey() {
        let out = filter(&flat_nv21(6, 4, 93), 6, 4, FilterSelector::PassthroughConvert);
        for px in out.pixels().chunks_exact(4) {
            assert_eq!(px, [93, 93, 93, 255]);
        }
        assert_eq!(out.filter(), Some(FilterSelector::PassthroughConvert));
    }

    #[test]
    fn laplacian_of_constant_frame_is_black() {
        let out = filter(&flat_nv21(6, 4, 180), 6, 4, FilterSelector::Laplacian);
        assert!(out.pixels().chunks_exact(4).all(|px| px == [0, 0, 0, 255]));
    }

    #[test]
    fn gaussian_of_constant_frame_equals_field() {
        let out = filter(&flat_nv21(6, 4, 180), 6, 4, FilterSelector::Gaussian);
        assert!(out.pixels().chunks_exact(4).all(|px| px == [180, 180, 180, 255]));
    }

    #[test]
    fn convolutions_stay_in_bounds_on_three_by_three_input() {
        // Exact-length buffer: any read past the frame would panic on the slice bounds
        let mut data = vec![10u8, 20, 30, 40, 50, 60, 70, 80, 90];
        data.resize(SourceFormat::Nv21.frame_len(3, 3), 128);
        for selector in [FilterSelector::Laplacian, FilterSelector::Gaussian] {
            let out = filter(&data, 3, 3, selector);
            assert_eq!(out.pixels().len(), 36);
            assert!(out.pixels().chunks_exact(4).all(|px| px[3] == 255));
        }
        // Gaussian centre: (10+2*20+30 + 2*40+4*50+2*60 + 70+2*80+90 + 8) / 16 = 50
        assert_eq!(filter(&data, 3, 3, FilterSelector::Gaussian).pixel(1, 1), [50, 50, 50, 255]);
    }

    #[test]
    fn short_input_is_dimension_mismatch() {
        let mut out = FilteredImage::new(4, 4);
        let data = [0u8; 16];
        let frame = RawFrame::new(&data, 4, 4, SourceFormat::Nv21);
        let err = BuiltinFilter
            .apply(&mut out, &frame, FilterSelector::PassthroughConvert)
            .unwrap_err();
        assert_eq!(
            err,
            FilterError::DimensionMismatch {
                role: BufferRole::Input,
                expected: 24,
                actual: 16,
            }
        );
        assert!(out.pixels().iter().all(|&b| b == 0));
        assert_eq!(out.filter(), None);
    }

    #[test]
    fn mismatched_output_is_dimension_mismatch() {
        let mut out = FilteredImage::new(2, 2);
        let data = flat_nv21(4, 4, 10);
        let frame = RawFrame::new(&data, 4, 4, SourceFormat::Nv21);
        let err = BuiltinFilter
            .apply(&mut out, &frame, FilterSelector::Gaussian)
            .unwrap_err();
        assert!(matches!(
            err,
            FilterError::DimensionMismatch {
                role: BufferRole::Output,
                ..
            }
        ));
    }

    #[test]
    fn filter_trait_object_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn PixelFilter>();
    }
}
