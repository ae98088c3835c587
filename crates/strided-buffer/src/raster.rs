//! The narrow contract external image routines program against.

use crate::{Dimension, Pixel, StridedBuffer};

/// A 2D grid of samples addressed by `(column, row)`.
///
/// Codecs, pixel-format routines and compositors take `impl Raster` instead
/// of a concrete buffer type; pointer access is there for bulk algorithms
/// that walk rows themselves using [`stride`](Raster::stride).
pub trait Raster {
    type Sample: Pixel;

    fn width(&self) -> usize;
    fn height(&self) -> usize;

    fn dimension(&self) -> Dimension {
        Dimension::new(self.width(), self.height())
    }

    /// Signed byte distance between consecutive rows.
    fn stride(&self) -> isize;

    fn get(&self, i: usize, j: usize) -> Self::Sample;
    fn set(&mut self, i: usize, j: usize, value: Self::Sample);

    fn as_ptr(&self) -> *const Self::Sample;
    fn as_mut_ptr(&mut self) -> *mut Self::Sample;
}

impl<T: Pixel> Raster for StridedBuffer<'_, T> {
    type Sample = T;

    #[inline]
    fn width(&self) -> usize {
        StridedBuffer::width(self)
    }

    #[inline]
    fn height(&self) -> usize {
        StridedBuffer::height(self)
    }

    #[inline]
    fn dimension(&self) -> Dimension {
        StridedBuffer::dimension(self)
    }

    #[inline]
    fn stride(&self) -> isize {
        StridedBuffer::stride(self)
    }

    #[inline]
    fn get(&self, i: usize, j: usize) -> T {
        StridedBuffer::get(self, i, j)
    }

    #[inline]
    fn set(&mut self, i: usize, j: usize, value: T) {
        StridedBuffer::set(self, i, j, value)
    }

    #[inline]
    fn as_ptr(&self) -> *const T {
        StridedBuffer::as_ptr(self)
    }

    #[inline]
    fn as_mut_ptr(&mut self) -> *mut T {
        StridedBuffer::as_mut_ptr(self)
    }
}

/// Writes `value` to every element through the contract.
pub fn fill<R: Raster + ?Sized>(dst: &mut R, value: R::Sample) {
    for j in 0..dst.height() {
        for i in 0..dst.width() {
            dst.set(i, j, value);
        }
    }
}

/// Element-by-element copy through the contract, independent of memory
/// layout.
///
/// # Panics
///
/// Panics if the dimensions differ.
pub fn copy_elementwise<S, D>(dst: &mut D, src: &S)
where
    S: Raster + ?Sized,
    D: Raster<Sample = S::Sample> + ?Sized,
{
    assert_eq!(
        dst.dimension(),
        src.dimension(),
        "copy requires equal dimensions"
    );
    for j in 0..src.height() {
        for i in 0..src.width() {
            dst.set(i, j, src.get(i, j));
        }
    }
}
