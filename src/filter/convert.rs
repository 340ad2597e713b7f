use crate::filter::types::{RawFrame, SourceFormat};

/// Convert one luma sample and its V/U pair to opaque RGBA.
///
/// BT.601 full-range transform in 8.8 fixed point. With neutral chroma
/// (U = V = 128) the result is exactly `[y, y, y, 255]`.
#[inline]
pub fn yuv_to_rgba(y: u8, u: u8, v: u8) -> [u8; 4] {
    let y = i32::from(y) * 256;
    let u = i32::from(u) - 128;
    let v = i32::from(v) - 128;
    [
        ((y + 359 * v) >> 8).clamp(0, 255) as u8,
        ((y - 88 * u - 183 * v) >> 8).clamp(0, 255) as u8,
        ((y + 454 * u) >> 8).clamp(0, 255) as u8,
        255,
    ]
}

/// Convert an NV21 frame into `out`, one `[r, g, b, a]` per pixel.
///
/// The caller has already validated both buffers against the frame size.
pub fn nv21_to_rgba(frame: &RawFrame<'_>, out: &mut [[u8; 4]]) {
    let width = frame.width() as usize;
    let luma = frame.luma();
    let chroma = frame.chroma();
    let stride = SourceFormat::chroma_stride(frame.width());

    for (row, (luma_row, out_row)) in luma
        .chunks_exact(width)
        .zip(out.chunks_exact_mut(width))
        .enumerate()
    {
        let chroma_row = &chroma[(row / 2) * stride..(row / 2 + 1) * stride];
        for (col, (&y, px)) in luma_row.iter().zip(out_row.iter_mut()).enumerate() {
            let pair = (col / 2) * 2;
            // NV21 stores V before U
            let v = chroma_row[pair];
            let u = chroma_row[pair + 1];
            *px = yuv_to_rgba(y, u, v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(data: &[u8], width: u32, height: u32) -> Vec<[u8; 4]> {
        let frame = RawFrame::new(data, width, height, SourceFormat::Nv21);
        frame.validate().unwrap();
        let mut out = vec![[0u8; 4]; (width * height) as usize];
        nv21_to_rgba(&frame, &mut out);
        out
    }

    #[test]
    fn neutral_chroma_produces_grey() {
        assert_eq!(yuv_to_rgba(0, 128, 128), [0, 0, 0, 255]);
        assert_eq!(yuv_to_rgba(128, 128, 128), [128, 128, 128, 255]);
        assert_eq!(yuv_to_rgba(255, 128, 128), [255, 255, 255, 255]);
    }

    #[test]
    fn chroma_offsets_follow_bt601() {
        // U = 160, V = 96
        assert_eq!(yuv_to_rgba(100, 160, 96), [55, 111, 156, 255]);
        // Saturates low on red, high on blue
        assert_eq!(yuv_to_rgba(0, 255, 255), [178, 0, 225, 255]);
        assert_eq!(yuv_to_rgba(255, 0, 0), [75, 255, 28, 255]);
    }

    #[test]
    fn converts_uniform_nv21_to_uniform_grey() {
        let mut nv21 = vec![77u8; 8 * 6];
        nv21.extend_from_slice(&[128u8; 8 * 3]);
        let rgba = convert(&nv21, 8, 6);
        assert!(rgba.iter().all(|px| *px == [77, 77, 77, 255]));
    }

    #[test]
    fn two_by_two_blocks_share_one_chroma_pair() {
        // 4x2: two chroma pairs, left block (V=96,U=160), right block neutral
        let mut nv21 = vec![100u8; 8];
        nv21.extend_from_slice(&[96, 160, 128, 128]);
        let rgba = convert(&nv21, 4, 2);
        for &idx in &[0usize, 1, 4, 5] {
            assert_eq!(rgba[idx], [55, 111, 156, 255]);
        }
        for &idx in &[2usize, 3, 6, 7] {
            assert_eq!(rgba[idx], [100, 100, 100, 255]);
        }
    }

    #[test]
    fn odd_width_uses_partial_chroma_block() {
        // 3x1: chroma row holds two pairs, the second covers column 2 alone
        let nv21 = [10u8, 20, 30, 128, 128, 96, 160];
        let rgba = convert(&nv21, 3, 1);
        assert_eq!(rgba[0], [10, 10, 10, 255]);
        assert_eq!(rgba[1], [20, 20, 20, 255]);
        assert_eq!(rgba[2], yuv_to_rgba(30, 160, 96));
    }
}
