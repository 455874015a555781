/// Create a box blur kernel.
///
/// # Arguments
///
/// * `kernel_size` - The size of the kernel.
///
/// # Returns
///
/// A vector of the kernel.
pub fn box_blur_kernel_1d(kernel_size: usize) -> Vec<f32> {
    vec![1.0 / kernel_size as f32; kernel_size]
}

/// Create a gaussian blur kernel.
///
/// # Arguments
///
/// * `kernel_size` - The size of the kernel.
/// * `sigma` - The sigma of the gaussian kernel.
///
/// # Returns
///
/// A vector of the kernel.
pub fn gaussian_kernel_1d(kernel_size: usize, sigma: f32) -> Vec<f32> {
    let mut kernel = Vec::with_capacity(kernel_size);

    let mean = (kernel_size - 1) as f32 / 2.0;
    let sigma_sq = sigma * sigma;

    // compute the kernel
    for i in 0..kernel_size {
        let x = i as f32 - mean;
        kernel.push((-(x * x) / (2.0 * sigma_sq)).exp());
    }

    // normalize the kernel
    let norm = kernel.iter().sum::<f32>();
    kernel.iter_mut().for_each(|k| *k /= norm);
    kernel
}

/// Derive the gaussian sigma from the kernel size.
///
/// sigma = 0.3 * ((kernel_size - 1) * 0.5 - 1) + 0.8
pub fn sigma_from_kernel_size(kernel_size: usize) -> f32 {
    0.3 * ((kernel_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Create a gaussian kernel whose sigma is derived from its size.
///
/// Sizes up to 7 use the fixed binomial-like taps; larger sizes sample the gaussian with
/// [`sigma_from_kernel_size`].
///
/// # Examples
///
/// ```
/// use tilecv_imgproc::filter::kernels::gaussian_kernel_1d_from_size;
///
/// assert_eq!(gaussian_kernel_1d_from_size(3), vec![0.25, 0.5, 0.25]);
/// assert_eq!(gaussian_kernel_1d_from_size(55).len(), 55);
/// ```
pub fn gaussian_kernel_1d_from_size(kernel_size: usize) -> Vec<f32> {
    match kernel_size {
        1 => vec![1.0],
        3 => vec![0.25, 0.5, 0.25],
        5 => vec![0.0625, 0.25, 0.375, 0.25, 0.0625],
        7 => vec![
            0.03125, 0.109375, 0.21875, 0.28125, 0.21875, 0.109375, 0.03125,
        ],
        _ => gaussian_kernel_1d(kernel_size, sigma_from_kernel_size(kernel_size)),
    }
}

/// Create the 3x3 sobel kernels.
///
/// # Returns
///
/// The derivative and the smoothing kernels, in this order.
pub fn sobel_kernel_1d() -> ([f32; 3], [f32; 3]) {
    ([-1.0, 0.0, 1.0], [1.0, 2.0, 1.0])
}

/// Create the 1d second derivative kernel of the 3x3 laplacian aperture.
pub fn second_derivative_kernel_1d() -> [f32; 3] {
    [1.0, -2.0, 1.0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sobel_kernel_1d() {
        let (derivative, smooth) = sobel_kernel_1d();
        assert_eq!(derivative, [-1.0, 0.0, 1.0]);
        assert_eq!(smooth, [1.0, 2.0, 1.0]);
    }

    #[test]
    fn test_gaussian_kernel_1d() {
        let kernel = gaussian_kernel_1d(5, 0.5);

        let expected = [
            0.00026386508,
            0.10645077,
            0.78657067,
            0.10645077,
            0.00026386508,
        ];

        for (i, &k) in kernel.iter().enumerate() {
            approx::assert_relative_eq!(k, expected[i], epsilon = 1e-6);
        }
    }

    #[test]
    fn test_sigma_from_kernel_size() {
        approx::assert_relative_eq!(sigma_from_kernel_size(3), 0.8);
        approx::assert_relative_eq!(sigma_from_kernel_size(55), 8.6, epsilon = 1e-5);
    }

    #[test]
    fn test_gaussian_kernel_1d_from_size() {
        let kernel = gaussian_kernel_1d_from_size(55);
        approx::assert_relative_eq!(kernel.iter().sum::<f32>(), 1.0, epsilon = 1e-5);
        assert_eq!(kernel[0], kernel[54]);
        assert!(kernel[27] > kernel[26]);
    }
}
