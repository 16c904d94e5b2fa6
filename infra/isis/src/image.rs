use std::fmt;

/// Rectangular pixel window, in 0-based sample (`col`) and line (`row`) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelBox {
    pub col: usize,
    pub row: usize,
    pub width: usize,
    pub height: usize,
}

impl PixelBox {
    #[must_use]
    pub const fn new(col: usize, row: usize, width: usize, height: usize) -> Self {
        Self { col, row, width, height }
    }

    /// Window covering a whole `cols` x `rows` image.
    #[must_use]
    pub const fn full(cols: usize, rows: usize) -> Self {
        Self::new(0, 0, cols, rows)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[must_use]
    pub const fn fits_within(&self, cols: usize, rows: usize) -> bool {
        match (self.col.checked_add(self.width), self.row.checked_add(self.height)) {
            (Some(right), Some(bottom)) => right <= cols && bottom <= rows,
            _ => false,
        }
    }
}

impl fmt::Display for PixelBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.col, self.row)
    }
}

/// Decoded samples, plane-major then row-major. Special pixels are NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub cols: usize,
    pub rows: usize,
    pub planes: usize,
    pub data: Vec<f32>,
}

/// Summary of the valid samples of an [`ImageBuffer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageStats {
    pub valid: usize,
    pub min: f32,
    pub max: f32,
    pub mean: f64,
}

impl ImageBuffer {
    #[must_use]
    pub fn get(&self, col: usize, row: usize, plane: usize) -> Option<f32> {
        if col >= self.cols || row >= self.rows || plane >= self.planes {
            return None;
        }
        self.data.get((plane * self.rows + row) * self.cols + col).copied()
    }

    #[must_use]
    pub fn plane(&self, plane: usize) -> Option<&[f32]> {
        let len = self.cols * self.rows;
        self.data.get(plane * len..(plane + 1) * len)
    }

    /// Number of samples that are not special pixels.
    #[must_use]
    pub fn valid_count(&self) -> usize {
        self.data.iter().filter(|v| !v.is_nan()).count()
    }

    /// Min, max and mean over valid samples; `None` if every sample is special.
    #[must_use]
    pub fn stats(&self) -> Option<ImageStats> {
        ImageStats::collect(&self.data)
    }

    /// [`Self::stats`] restricted to one plane.
    #[must_use]
    pub fn plane_stats(&self, plane: usize) -> Option<ImageStats> {
        self.plane(plane).and_then(ImageStats::collect)
    }
}

impl ImageStats {
    fn collect(samples: &[f32]) -> Option<Self> {
        let mut valid = 0_usize;
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        let mut sum = 0.0_f64;

        for &v in samples.iter().filter(|v| !v.is_nan()) {
            valid += 1;
            min = min.min(v);
            max = max.max(v);
            sum += f64::from(v);
        }

        (valid > 0).then(|| Self { valid, min, max, mean: sum / valid as f64 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_box_bounds() {
        assert!(PixelBox::new(2, 1, 3, 2).fits_within(5, 3));
        assert!(!PixelBox::new(3, 0, 3, 1).fits_within(5, 3));
        assert!(!PixelBox::new(usize::MAX, 0, 2, 1).fits_within(5, 3));
        assert_eq!(PixelBox::new(2, 1, 3, 2).to_string(), "3x2+2+1");
    }

    #[test]
    fn indexing_and_stats_skip_specials() {
        let image = ImageBuffer {
            cols: 2,
            rows: 2,
            planes: 2,
            data: vec![1.0, f32::NAN, 3.0, 4.0, 10.0, 20.0, f32::NAN, 30.0],
        };

        assert_eq!(image.get(1, 1, 0), Some(4.0));
        assert_eq!(image.get(0, 0, 1), Some(10.0));
        assert_eq!(image.get(2, 0, 0), None);
        assert_eq!(image.plane(1).map(<[f32]>::len), Some(4));
        assert_eq!(image.valid_count(), 6);

        let stats = image.stats().unwrap();
        assert_eq!(stats.valid, 6);
        assert_eq!((stats.min, stats.max), (1.0, 30.0));
        assert!((stats.mean - 68.0 / 6.0).abs() < 1e-9);

        let second = image.plane_stats(1).unwrap();
        assert_eq!((second.valid, second.min, second.max), (3, 10.0, 30.0));
        assert_eq!(image.plane_stats(2), None);
    }
}
