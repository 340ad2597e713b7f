/// A 3x3 integer convolution kernel applied to the luma plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kernel3 {
    weights: [[i32; 3]; 3],
    /// Power-of-two normaliser, applied with round-half-up.
    shift: u32,
    /// Report the magnitude of the response instead of clamping negatives to 0.
    magnitude: bool,
}

/// Four-neighbour Laplacian. Weights sum to zero.
pub const LAPLACIAN: Kernel3 = Kernel3 {
    weights: [[0, 1, 0], [1, -4, 1], [0, 1, 0]],
    shift: 0,
    magnitude: true,
};

/// Binomial approximation of a Gaussian, normalised by 16.
pub const GAUSSIAN: Kernel3 = Kernel3 {
    weights: [[1, 2, 1], [2, 4, 2], [1, 2, 1]],
    shift: 4,
    magnitude: false,
};

impl Kernel3 {
    pub fn weight_sum(&self) -> i32 {
        self.weights.iter().flatten().sum()
    }

    #[inline]
    fn finish(&self, acc: i32) -> u8 {
        let acc = if self.magnitude { acc.abs() } else { acc };
        let scaled = if self.shift == 0 {
            acc
        } else {
            (acc + (1 << (self.shift - 1))) >> self.shift
        };
        scaled.clamp(0, 255) as u8
    }

    /// Convolve `luma` (row-major, `width * height`) into `out` as opaque grey.
    ///
    /// Neighbours outside the frame are clamped to the nearest edge sample.
    pub fn apply(&self, luma: &[u8], width: usize, height: usize, out: &mut [[u8; 4]]) {
        for y in 0..height {
            let rows = [y.saturating_sub(1), y, (y + 1).min(height - 1)];
            for x in 0..width {
                let cols = [x.saturating_sub(1), x, (x + 1).min(width - 1)];
                let mut acc = 0i32;
                for (krow, &sy) in self.weights.iter().zip(rows.iter()) {
                    let line = &luma[sy * width..(sy + 1) * width];
                    for (&w, &sx) in krow.iter().zip(cols.iter()) {
                        acc += w * i32::from(line[sx]);
                    }
                }
                let v = self.finish(acc);
                out[y * width + x] = [v, v, v, 255];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(kernel: &Kernel3, luma: &[u8], width: usize, height: usize) -> Vec<[u8; 4]> {
        let mut out = vec![[0u8; 4]; width * height];
        kernel.apply(luma, width, height, &mut out);
        out
    }

    #[test]
    fn laplacian_weights_sum_to_zero() {
        assert_eq!(LAPLACIAN.weight_sum(), 0);
    }

    #[test]
    fn gaussian_weights_sum_to_normaliser() {
        assert_eq!(GAUSSIAN.weight_sum(), 1 << GAUSSIAN.shift);
    }

    #[test]
    fn laplacian_of_flat_field_is_zero() {
        let out = run(&LAPLACIAN, &[90u8; 25], 5, 5);
        assert!(out.iter().all(|px| *px == [0, 0, 0, 255]));
    }

    #[test]
    fn gaussian_of_flat_field_is_unchanged() {
        for value in [0u8, 1, 37, 128, 255] {
            let out = run(&GAUSSIAN, &[value; 25], 5, 5);
            assert!(out.iter().all(|px| *px == [value, value, value, 255]));
        }
    }

    #[test]
    fn laplacian_responds_to_isolated_spike() {
        let mut luma = [0u8; 9];
        luma[4] = 50;
        let out = run(&LAPLACIAN, &luma, 3, 3);
        // centre: |-4 * 50|, clamped
        assert_eq!(out[4][0], 200);
        // edge neighbours see +50, corners see nothing
        assert_eq!(out[1][0], 50);
        assert_eq!(out[0][0], 0);
    }

    #[test]
    fn gaussian_spreads_isolated_spike() {
        let mut luma = [0u8; 9];
        luma[4] = 160;
        let out = run(&GAUSSIAN, &luma, 3, 3);
        assert_eq!(out[4][0], 40); // 160 * 4 / 16
        assert_eq!(out[1][0], 20); // 160 * 2 / 16
        assert_eq!(out[0][0], 10); // 160 * 1 / 16
    }

    #[test]
    fn borders_replicate_edge_samples_on_minimal_frames() {
        // 1x1: every neighbour clamps to the single sample
        assert_eq!(run(&LAPLACIAN, &[200], 1, 1), vec![[0, 0, 0, 255]]);
        assert_eq!(run(&GAUSSIAN, &[200], 1, 1), vec![[200, 200, 200, 255]]);
        // 3x1 ramp: left edge replicates 0, right edge replicates 20
        let out = run(&LAPLACIAN, &[0, 10, 20], 3, 1);
        assert_eq!(out[0][0], 10);
        assert_eq!(out[1][0], 0);
        assert_eq!(out[2][0], 10);
    }
}
