use tilecv_image::ImageError;

/// Shapes of morphological `Kernels`.
///
/// All kernels are centered at their geometric center, so both sides must be odd.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelShape {
    /// A rectangular structuring element.
    ///
    /// All pixels within the box are included in the morphological operation.
    Box {
        /// The width of the box.
        width: usize,
        /// The height of the box.
        height: usize,
    },

    /// An ellipse (or circle) inscribed in the kernel rectangle.
    Ellipse {
        /// The width of the ellipse.
        width: usize,
        /// The height of the ellipse.
        height: usize,
    },
}

/// A morphological structuring element.
///
/// Every row of the supported shapes is one contiguous run of active pixels centered on the
/// middle column, so the kernel is stored as the half-width of the run of each row.
///
/// # Example
///
/// ```rust
/// use tilecv_imgproc::morphology::{Kernel, KernelShape};
///
/// let kernel = Kernel::new(KernelShape::Box { width: 7, height: 7 }).unwrap();
/// assert_eq!(kernel.width(), 7);
/// assert_eq!(kernel.height(), 7);
/// assert_eq!(kernel.pad(), (3, 3));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kernel {
    half_widths: Vec<usize>,
    width: usize,
}

impl Kernel {
    /// Create a morphological kernel from a shape.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidKernelSize`] if a side is even or zero.
    pub fn new(shape: KernelShape) -> Result<Self, ImageError> {
        let (width, height) = match shape {
            KernelShape::Box { width, height } | KernelShape::Ellipse { width, height } => {
                (width, height)
            }
        };

        if width % 2 == 0 || height % 2 == 0 {
            return Err(ImageError::InvalidKernelSize(width, height));
        }

        let half_widths = match shape {
            KernelShape::Box { .. } => vec![width / 2; height],
            KernelShape::Ellipse { .. } => ellipse_half_widths(width, height),
        };

        Ok(Self { half_widths, width })
    }

    /// Get the width of the kernel.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Get the height of the kernel.
    pub fn height(&self) -> usize {
        self.half_widths.len()
    }

    /// Get the padding for the kernel (offset from center), rows first.
    pub fn pad(&self) -> (usize, usize) {
        (self.height() / 2, self.width / 2)
    }

    /// Half-width of the active run of each kernel row.
    pub fn half_widths(&self) -> &[usize] {
        &self.half_widths
    }

    /// Expand the kernel into a dense row-major mask of 0 and 1.
    pub fn to_mask(&self) -> Vec<u8> {
        let center = self.width / 2;
        let mut mask = vec![0u8; self.width * self.height()];
        for (row, &half) in mask.chunks_exact_mut(self.width).zip(&self.half_widths) {
            row[center - half..=center + half].fill(1);
        }
        mask
    }
}

// Row spans of an ellipse inscribed in the kernel rectangle: dx = round(c * sqrt(1 - dy²/r²)).
fn ellipse_half_widths(width: usize, height: usize) -> Vec<usize> {
    let r = (height / 2) as f64;
    let c = (width / 2) as f64;
    let inv_r2 = if r > 0.0 { 1.0 / (r * r) } else { 0.0 };

    (0..height)
        .map(|i| {
            let dy = i as f64 - r;
            let dx = (c * ((r * r - dy * dy) * inv_r2).sqrt()).round();
            (dx as usize).min(width / 2)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_kernel() -> Result<(), ImageError> {
        let kernel = Kernel::new(KernelShape::Box {
            width: 3,
            height: 5,
        })?;
        assert_eq!(kernel.width(), 3);
        assert_eq!(kernel.height(), 5);
        assert_eq!(kernel.pad(), (2, 1));
        assert!(kernel.to_mask().iter().all(|&v| v == 1));
        Ok(())
    }

    #[test]
    fn test_ellipse_kernel_5x5() -> Result<(), ImageError> {
        let kernel = Kernel::new(KernelShape::Ellipse {
            width: 5,
            height: 5,
        })?;

        #[rustfmt::skip]
        assert_eq!(
            kernel.to_mask(),
            vec![
                0, 0, 1, 0, 0,
                1, 1, 1, 1, 1,
                1, 1, 1, 1, 1,
                1, 1, 1, 1, 1,
                0, 0, 1, 0, 0,
            ]
        );
        Ok(())
    }

    #[test]
    fn test_ellipse_kernel_17x17() -> Result<(), ImageError> {
        let kernel = Kernel::new(KernelShape::Ellipse {
            width: 17,
            height: 17,
        })?;
        let halves = kernel.half_widths();
        assert_eq!(halves.len(), 17);
        assert_eq!(halves[0], 0);
        assert_eq!(halves[8], 8);
        assert_eq!(halves[0], halves[16]);
        Ok(())
    }

    #[test]
    fn test_even_kernel() {
        let res = Kernel::new(KernelShape::Box {
            width: 4,
            height: 3,
        });
        assert_eq!(res, Err(ImageError::InvalidKernelSize(4, 3)));
    }
}
