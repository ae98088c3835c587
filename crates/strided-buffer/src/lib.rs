//! Row-strided 2D sample buffers.
//!
//! [`StridedBuffer`] is the pixel/sample container image-processing code is
//! built on. A single type covers three storage situations:
//!
//! - exclusively owned, 64-byte aligned heap storage ([`StridedBuffer::new`]),
//! - a borrowed view over caller memory with an arbitrary row stride
//!   ([`StridedBuffer::from_slice_with_stride`], [`StridedBuffer::from_raw_parts`]),
//! - sub-views aliasing a parent's region ([`StridedBuffer::subview`]).
//!
//! Duplicating an owning buffer allocates a fresh, independent copy;
//! duplicating a borrowing buffer yields another view of the same memory.
//! The crate does no format conversion, I/O or image processing: consumers
//! work through the [`Raster`] contract.
//!
//! ```
//! use strided_buffer::{Dimension, Point, StridedBuffer};
//!
//! let mut img = StridedBuffer::<u8>::filled(Dimension::new(8, 4), 0).unwrap();
//! {
//!     let mut roi = img.subview(Point::new(2, 1), Dimension::new(3, 2));
//!     roi.fill(255);
//! }
//! assert_eq!(img.get(2, 1), 255);
//! assert_eq!(img.get(1, 1), 0);
//! ```

mod alloc;
mod buffer;
mod copy;
mod error;
mod geometry;
mod logger;
mod pixel;
mod raster;

pub use alloc::BUFFER_ALIGN;
pub use buffer::StridedBuffer;
pub use copy::CopyStrategy;
pub use error::BufferError;
pub use geometry::{Dimension, Point};
pub use pixel::Pixel;
pub use raster::{copy_elementwise, fill, Raster};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
