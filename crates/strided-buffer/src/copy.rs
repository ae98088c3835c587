//! Bulk content copy between buffers of equal dimension.

use std::ptr;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{Pixel, StridedBuffer};

/// How [`StridedBuffer::copy_from`] moves bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CopyStrategy {
    /// Both sides dense: one transfer of `width * height` elements.
    Linear,
    /// Equal strides: one transfer of the row footprint, inter-row padding
    /// included.
    Footprint,
    /// Strides differ: one transfer of `width` elements per row.
    RowByRow,
}

impl<T: Pixel> StridedBuffer<'_, T> {
    /// The strategy [`copy_from`](Self::copy_from) would use for `source`.
    pub fn copy_strategy(&self, source: &StridedBuffer<'_, T>) -> CopyStrategy {
        if self.is_dense() && source.is_dense() {
            CopyStrategy::Linear
        } else if self.stride() == source.stride() {
            CopyStrategy::Footprint
        } else {
            CopyStrategy::RowByRow
        }
    }

    /// Copies the contents of `source` into this buffer.
    ///
    /// With equal strides the padding between rows is copied along with the
    /// rows; use [`copy_rows_from`](Self::copy_rows_from) when that padding
    /// holds data that must survive (for example a sub-view of a wider
    /// image).
    ///
    /// The equal-stride transfer is `(height - 1) * |stride| + width * size_of::<T>()`
    /// bytes, not `stride * height`: padding after the last row is neither
    /// read nor written, since a sub-view or a tightly sized slice does not
    /// own it. Rows copied one by one move `width * size_of::<T>()` bytes
    /// each and leave the destination padding alone.
    ///
    /// # Panics
    ///
    /// Panics if the dimensions differ.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "trace", skip_all, fields(width = self.width(), height = self.height()))
    )]
    pub fn copy_from(&mut self, source: &StridedBuffer<'_, T>) {
        self.assert_same_dimension(source);
        if self.is_empty() {
            return;
        }
        let strategy = self.copy_strategy(source);
        log::trace!(
            "copy {}x{} via {strategy:?} (strides {} <- {})",
            self.width(),
            self.height(),
            self.stride(),
            source.stride()
        );
        match strategy {
            CopyStrategy::Linear => {
                let bytes = self.row_bytes() * self.height();
                // SAFETY: both regions are dense and valid for `bytes`.
                unsafe { ptr::copy(source.row_ptr(0), self.row_ptr(0), bytes) }
            }
            CopyStrategy::Footprint => {
                let (start, bytes) = self.footprint();
                let (src_start, _) = source.footprint();
                // SAFETY: equal stride and dimension give equal footprints,
                // and every byte of a footprint lies between valid rows.
                unsafe { ptr::copy(src_start, start, bytes) }
            }
            CopyStrategy::RowByRow => self.copy_each_row(source),
        }
    }

    /// Copies `source` one row at a time, touching only the `width`
    /// elements of each row and never the padding.
    ///
    /// # Panics
    ///
    /// Panics if the dimensions differ.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "trace", skip_all, fields(width = self.width(), height = self.height()))
    )]
    pub fn copy_rows_from(&mut self, source: &StridedBuffer<'_, T>) {
        self.assert_same_dimension(source);
        if self.is_empty() {
            return;
        }
        self.copy_each_row(source);
    }

    fn copy_each_row(&mut self, source: &StridedBuffer<'_, T>) {
        let row_bytes = self.row_bytes();
        let mut src = source.row_ptr(0).cast_const();
        let mut dst = self.row_ptr(0);
        for _ in 0..self.height() {
            // SAFETY: each cursor addresses the start of a valid row holding
            // at least `row_bytes` bytes.
            unsafe { ptr::copy(src, dst, row_bytes) };
            src = src.wrapping_offset(source.stride());
            dst = dst.wrapping_offset(self.stride());
        }
    }

    /// Lowest-addressed byte of the region and the length up to the end of
    /// the highest-addressed row's content.
    fn footprint(&self) -> (*mut u8, usize) {
        let last = self.height() - 1;
        let start = if self.stride() < 0 {
            self.row_ptr(last)
        } else {
            self.row_ptr(0)
        };
        let bytes = last * self.stride().unsigned_abs() + self.row_bytes();
        (start, bytes)
    }

    fn assert_same_dimension(&self, source: &StridedBuffer<'_, T>) {
        assert_eq!(
            self.dimension(),
            source.dimension(),
            "copy requires equal dimensions"
        );
    }
}
