use rayon::prelude::*;

use tilecv_image::Image;

/// Apply a function to each pixel in the image in parallel.
///
/// The closure receives the `C1` source channels and the `C2` destination channels of one
/// pixel. Rows are distributed over the rayon thread pool.
///
/// PRECONDITION: `src` and `dst` must have the same size.
pub fn par_iter_rows<T1, const C1: usize, T2, const C2: usize>(
    src: &Image<T1, C1>,
    dst: &mut Image<T2, C2>,
    f: impl Fn(&[T1], &mut [T2]) + Send + Sync,
) where
    T1: Send + Sync,
    T2: Send + Sync,
{
    let cols = src.cols();
    if cols == 0 || src.rows() == 0 {
        return;
    }

    src.as_slice()
        .par_chunks_exact(C1 * cols)
        .zip(dst.as_slice_mut().par_chunks_exact_mut(C2 * cols))
        .for_each(|(src_chunk, dst_chunk)| {
            src_chunk
                .chunks_exact(C1)
                .zip(dst_chunk.chunks_exact_mut(C2))
                .for_each(|(src_pixel, dst_pixel)| {
                    f(src_pixel, dst_pixel);
                });
        });
}

/// Apply a function to each element in the image in parallel.
///
/// PRECONDITION: `src` and `dst` must have the same size.
pub fn par_iter_rows_val<T1, T2, const C: usize>(
    src: &Image<T1, C>,
    dst: &mut Image<T2, C>,
    f: impl Fn(&T1, &mut T2) + Send + Sync,
) where
    T1: Send + Sync,
    T2: Send + Sync,
{
    let cols = src.cols();
    if cols == 0 || src.rows() == 0 {
        return;
    }

    src.as_slice()
        .par_chunks_exact(C * cols)
        .zip(dst.as_slice_mut().par_chunks_exact_mut(C * cols))
        .for_each(|(src_chunk, dst_chunk)| {
            src_chunk
                .iter()
                .zip(dst_chunk.iter_mut())
                .for_each(|(src_val, dst_val)| f(src_val, dst_val));
        });
}

#[cfg(test)]
mod tests {
    use tilecv_image::{Image, ImageError};

    #[test]
    fn test_par_iter_rows() -> Result<(), ImageError> {
        let src = Image::<u8, 3>::new([2, 1].into(), vec![1, 2, 3, 4, 5, 6])?;
        let mut dst = Image::<u8, 1>::from_size_val(src.size(), 0)?;
        super::par_iter_rows(&src, &mut dst, |s, d| d[0] = s[0] + s[1] + s[2]);
        assert_eq!(dst.as_slice(), &[6, 15]);
        Ok(())
    }

    #[test]
    fn test_par_iter_rows_val_empty() -> Result<(), ImageError> {
        let src = Image::<u8, 1>::new([0, 0].into(), vec![])?;
        let mut dst = Image::<u8, 1>::new([0, 0].into(), vec![])?;
        super::par_iter_rows_val(&src, &mut dst, |s, d| *d = *s);
        assert!(dst.as_slice().is_empty());
        Ok(())
    }
}
