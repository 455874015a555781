/// Border handling modes for the neighbourhood operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderMode {
    /// Replicate the value of the nearest border pixel.
    ///
    /// Example: ...d c b a | a a a a...
    Replicate,

    /// Reflect the image across the border, excluding the border pixel.
    ///
    /// Example: ...d c b a | b c d e...
    #[default]
    Reflect101,
}

impl BorderMode {
    /// Map a possibly out-of-range coordinate onto `[0, len)`.
    ///
    /// `len` must be non-zero. Reflection is periodic, so offsets larger than the image
    /// extent (e.g. a 55-tap kernel on a narrow image) still land inside it.
    ///
    /// # Examples
    ///
    /// ```
    /// use tilecv_imgproc::border::BorderMode;
    ///
    /// assert_eq!(BorderMode::Reflect101.map(-1, 5), 1);
    /// assert_eq!(BorderMode::Reflect101.map(5, 5), 3);
    /// assert_eq!(BorderMode::Replicate.map(-3, 5), 0);
    /// ```
    #[inline]
    pub fn map(self, idx: isize, len: usize) -> usize {
        let last = len as isize - 1;
        if (0..=last).contains(&idx) {
            return idx as usize;
        }

        match self {
            BorderMode::Replicate => idx.clamp(0, last) as usize,
            BorderMode::Reflect101 => {
                if last == 0 {
                    return 0;
                }
                let period = 2 * last;
                let m = idx.rem_euclid(period);
                if m > last {
                    (period - m) as usize
                } else {
                    m as usize
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::BorderMode;

    #[test]
    fn test_reflect101() {
        let mapped: Vec<usize> = (-4..8).map(|i| BorderMode::Reflect101.map(i, 4)).collect();
        assert_eq!(mapped, vec![2, 3, 2, 1, 0, 1, 2, 3, 2, 1, 0, 1]);
    }

    #[test]
    fn test_reflect101_single() {
        assert_eq!(BorderMode::Reflect101.map(-7, 1), 0);
        assert_eq!(BorderMode::Reflect101.map(9, 1), 0);
    }

    #[test]
    fn test_replicate() {
        let mapped: Vec<usize> = (-2..5).map(|i| BorderMode::Replicate.map(i, 3)).collect();
        assert_eq!(mapped, vec![0, 0, 0, 1, 2, 2, 2]);
    }
}
