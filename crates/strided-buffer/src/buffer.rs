use std::fmt;
use std::marker::PhantomData;
use std::mem::size_of;
use std::ptr::NonNull;

use crate::alloc::AlignedAlloc;
use crate::{BufferError, Dimension, Pixel, Point};

/// Who is responsible for the memory behind a buffer.
enum Storage<'a> {
    /// Dense block released when the buffer drops.
    Owned(AlignedAlloc),
    /// Memory kept alive by someone else for `'a`.
    Borrowed(PhantomData<&'a mut [u8]>),
}

/// A `width x height` grid of `T` whose rows are `stride` bytes apart.
///
/// ```text
///  base
///   |<------------ stride ------------>|
///   |<-- width * size_of::<T>() -->|
///   +------------------------------+---+
///   | (0,0) (1,0) ...              |pad|   row 0
///   | (0,1) (1,1) ...              |pad|   row 1
///   | ...                          |pad|
///   +------------------------------+---+
/// ```
///
/// Owning buffers (`StridedBuffer<'static, T>` from [`new`](Self::new)) are
/// always dense and 64-byte aligned. Borrowing buffers wrap caller memory
/// for the lifetime `'a` and may have any stride not shorter than a row,
/// negative strides included. A [`subview`](Self::subview) never owns.
///
/// [`Clone`] follows the storage: an owner is deep-copied into a new
/// allocation, a borrower is copied as another view of the same memory.
pub struct StridedBuffer<'a, T: Pixel> {
    base: NonNull<u8>,
    dim: Dimension,
    stride: isize,
    storage: Storage<'a>,
    _marker: PhantomData<T>,
}

impl<T: Pixel> StridedBuffer<'static, T> {
    /// Allocates a dense, zero-initialized buffer.
    pub fn new(dim: Dimension) -> Result<Self, BufferError> {
        let (row_bytes, bytes) = dense_bytes::<T>(dim)?;
        let stride = isize::try_from(row_bytes).map_err(|_| size_overflow::<T>(dim))?;
        let alloc = AlignedAlloc::zeroed(bytes)?;
        Ok(Self {
            base: alloc.ptr(),
            dim,
            stride,
            storage: Storage::Owned(alloc),
            _marker: PhantomData,
        })
    }

    /// Allocates a dense buffer with every element set to `value`.
    pub fn filled(dim: Dimension, value: T) -> Result<Self, BufferError> {
        let mut buf = Self::new(dim)?;
        buf.fill(value);
        Ok(buf)
    }
}

impl<'a, T: Pixel> StridedBuffer<'a, T> {
    /// Wraps caller memory whose rows are `stride` bytes apart.
    ///
    /// `stride` may be negative for bottom-up layouts; `ptr` always
    /// addresses element `(0, 0)`.
    ///
    /// # Safety
    ///
    /// For the whole lifetime `'a`, every address
    /// `ptr + stride * j + size_of::<T>() * i` with `(i, j)` inside `dim`
    /// must be valid for reads and writes, and nothing outside the returned
    /// buffer (and its duplicates and sub-views) may access that memory.
    ///
    /// # Panics
    ///
    /// Panics if `ptr` is null or if `|stride|` is shorter than a row of a
    /// non-empty region.
    pub unsafe fn from_raw_parts(ptr: *mut T, dim: Dimension, stride: isize) -> Self {
        let Some(base) = NonNull::new(ptr.cast::<u8>()) else {
            panic!("borrowed buffer base must not be null");
        };
        let row_bytes = row_bytes_of::<T>(dim.width);
        assert!(
            dim.is_empty() || stride.unsigned_abs() >= row_bytes,
            "stride {stride} is shorter than a row of {row_bytes} bytes"
        );
        Self::borrowed(base, dim, stride)
    }

    /// Dense form of [`from_raw_parts`](Self::from_raw_parts).
    ///
    /// # Safety
    ///
    /// Same contract as [`from_raw_parts`](Self::from_raw_parts) with
    /// `stride = width * size_of::<T>()`.
    pub unsafe fn from_raw_parts_dense(ptr: *mut T, dim: Dimension) -> Self {
        let stride = isize::try_from(row_bytes_of::<T>(dim.width))
            .unwrap_or_else(|_| panic!("row of {} elements overflows isize", dim.width));
        // SAFETY: forwarded to the caller.
        unsafe { Self::from_raw_parts(ptr, dim, stride) }
    }

    /// Borrows a slice as a dense buffer.
    ///
    /// # Panics
    ///
    /// Panics if `data` holds fewer than `width * height` elements or if a
    /// row's byte length overflows `usize`.
    pub fn from_slice(data: &'a mut [T], dim: Dimension) -> Self {
        Self::from_slice_with_stride(data, dim, row_bytes_of::<T>(dim.width))
    }

    /// Borrows a slice whose rows are `stride` bytes apart.
    ///
    /// # Panics
    ///
    /// Panics if a row's byte length overflows `usize`, if `stride` is
    /// shorter than a row, or if `data` does not cover the footprint
    /// `(height - 1) * stride + width * size_of::<T>()` bytes.
    pub fn from_slice_with_stride(data: &'a mut [T], dim: Dimension, stride: usize) -> Self {
        let row_bytes = row_bytes_of::<T>(dim.width);
        assert!(
            dim.is_empty() || stride >= row_bytes,
            "stride {stride} is shorter than a row of {row_bytes} bytes"
        );
        let needed = footprint_bytes(dim, stride, row_bytes)
            .unwrap_or_else(|| panic!("footprint of {dim:?} with stride {stride} overflows"));
        let available = std::mem::size_of_val(&*data);
        assert!(
            needed <= available,
            "slice of {available} bytes is shorter than the {needed}-byte footprint of {dim:?} with stride {stride}"
        );
        let stride =
            isize::try_from(stride).unwrap_or_else(|_| panic!("stride {stride} overflows isize"));
        let Some(base) = NonNull::new(data.as_mut_ptr().cast::<u8>()) else {
            unreachable!("slice pointers are never null");
        };
        Self::borrowed(base, dim, stride)
    }

    /// Grows `bytes` to hold at least `width * height` elements (never
    /// shrinks it) and borrows it as a dense buffer.
    ///
    /// Newly added bytes are zero. The vector keeps ownership of the memory.
    pub fn from_byte_vec(bytes: &'a mut Vec<u8>, dim: Dimension) -> Result<Self, BufferError> {
        let (row_bytes, needed) = dense_bytes::<T>(dim)?;
        let stride = isize::try_from(row_bytes).map_err(|_| size_overflow::<T>(dim))?;
        if bytes.len() < needed {
            let extra = needed - bytes.len();
            bytes
                .try_reserve_exact(extra)
                .map_err(|_| BufferError::AllocationFailed {
                    bytes: needed,
                    align: 1,
                })?;
            bytes.resize(needed, 0);
            log::debug!("grew external byte buffer to {needed} bytes");
        }
        let Some(base) = NonNull::new(bytes.as_mut_ptr()) else {
            unreachable!("vector pointers are never null");
        };
        Ok(Self::borrowed(base, dim, stride))
    }

    fn borrowed(base: NonNull<u8>, dim: Dimension, stride: isize) -> Self {
        Self {
            base,
            dim,
            stride,
            storage: Storage::Borrowed(PhantomData),
            _marker: PhantomData,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.dim.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.dim.height
    }

    #[inline]
    pub fn dimension(&self) -> Dimension {
        self.dim
    }

    /// Signed byte distance from one row start to the next.
    #[inline]
    pub fn stride(&self) -> isize {
        self.stride
    }

    /// Meaningful bytes per row, `width * size_of::<T>()`.
    #[inline]
    pub fn row_bytes(&self) -> usize {
        self.dim.width * size_of::<T>()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dim.is_empty()
    }

    /// `true` when rows follow each other without padding.
    #[inline]
    pub fn is_dense(&self) -> bool {
        self.stride >= 0 && self.stride.unsigned_abs() == self.row_bytes()
    }

    /// `true` when dropping this instance releases its memory.
    #[inline]
    pub fn owns_storage(&self) -> bool {
        matches!(self.storage, Storage::Owned(_))
    }

    /// Address of element `(0, 0)`.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.base.as_ptr().cast_const().cast::<T>()
    }

    /// Mutable address of element `(0, 0)`.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.base.as_ptr().cast::<T>()
    }

    /// Whether `p` addresses an element; negative coordinates wrap to huge
    /// unsigned values and fail the same comparison.
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        (p.x as usize) < self.dim.width && (p.y as usize) < self.dim.height
    }

    #[inline]
    pub(crate) fn byte_offset(&self, i: usize, j: usize) -> isize {
        self.stride * j as isize + (size_of::<T>() * i) as isize
    }

    #[inline]
    pub(crate) fn row_ptr(&self, j: usize) -> *mut u8 {
        self.base.as_ptr().wrapping_offset(self.stride * j as isize)
    }

    /// Reads element `(i, j)` without a bounds check.
    ///
    /// # Safety
    ///
    /// `i < width` and `j < height`.
    #[inline]
    pub unsafe fn get_unchecked(&self, i: usize, j: usize) -> T {
        // SAFETY: the caller keeps (i, j) inside the region, which the
        // constructor contract makes valid for reads.
        unsafe {
            self.base
                .as_ptr()
                .offset(self.byte_offset(i, j))
                .cast::<T>()
                .read_unaligned()
        }
    }

    /// Writes element `(i, j)` without a bounds check.
    ///
    /// # Safety
    ///
    /// `i < width` and `j < height`.
    #[inline]
    pub unsafe fn set_unchecked(&mut self, i: usize, j: usize, value: T) {
        // SAFETY: the caller keeps (i, j) inside the region, which the
        // constructor contract makes valid for writes.
        unsafe {
            self.base
                .as_ptr()
                .offset(self.byte_offset(i, j))
                .cast::<T>()
                .write_unaligned(value)
        }
    }

    /// Reads element `(i, j)`.
    ///
    /// # Panics
    ///
    /// Panics if `(i, j)` is outside the buffer.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> T {
        self.assert_in_bounds(i, j);
        // SAFETY: bounds checked above.
        unsafe { self.get_unchecked(i, j) }
    }

    /// Writes element `(i, j)`.
    ///
    /// # Panics
    ///
    /// Panics if `(i, j)` is outside the buffer.
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: T) {
        self.assert_in_bounds(i, j);
        // SAFETY: bounds checked above.
        unsafe { self.set_unchecked(i, j, value) }
    }

    /// Reads the element at `p`, or `None` outside the buffer.
    #[inline]
    pub fn try_get(&self, p: Point) -> Option<T> {
        if !self.contains(p) {
            return None;
        }
        // SAFETY: `contains` guarantees 0 <= x < width and 0 <= y < height.
        Some(unsafe { self.get_unchecked(p.x as usize, p.y as usize) })
    }

    /// Writes the element at `p`; returns `false` and writes nothing outside
    /// the buffer.
    #[inline]
    pub fn try_set(&mut self, p: Point, value: T) -> bool {
        if !self.contains(p) {
            return false;
        }
        // SAFETY: `contains` guarantees 0 <= x < width and 0 <= y < height.
        unsafe { self.set_unchecked(p.x as usize, p.y as usize, value) };
        true
    }

    /// Sets every element to `value`. Row padding is left untouched.
    pub fn fill(&mut self, value: T) {
        for j in 0..self.dim.height {
            let row = self.row_ptr(j).cast::<T>();
            for i in 0..self.dim.width {
                // SAFETY: (i, j) is inside the region.
                unsafe { row.add(i).write_unaligned(value) };
            }
        }
    }

    /// A borrowing view of the `size` rectangle whose top-left corner is
    /// `origin`. Writes through the view land in this buffer's memory.
    ///
    /// # Panics
    ///
    /// Panics unless `[origin, origin + size)` lies inside the buffer.
    pub fn subview(&mut self, origin: Point, size: Dimension) -> StridedBuffer<'_, T> {
        // Negative coordinates wrap past any width/height.
        let (x, y) = (origin.x as usize, origin.y as usize);
        assert!(
            x <= self.dim.width
                && y <= self.dim.height
                && size.width <= self.dim.width - x
                && size.height <= self.dim.height - y,
            "subview {size:?} at {origin:?} exceeds buffer {:?}",
            self.dim
        );
        let base = self.base.as_ptr().wrapping_offset(self.byte_offset(x, y));
        let Some(base) = NonNull::new(base) else {
            unreachable!("offset inside a live region");
        };
        StridedBuffer::borrowed(base, size, self.stride)
    }

    /// Duplicates the buffer, reporting allocation failure instead of
    /// aborting.
    ///
    /// Owned storage is copied into a new allocation; borrowed storage is
    /// shared and nothing is allocated.
    pub fn try_clone(&self) -> Result<Self, BufferError> {
        let storage = match &self.storage {
            Storage::Owned(alloc) => Storage::Owned(alloc.try_clone()?),
            Storage::Borrowed(marker) => Storage::Borrowed(*marker),
        };
        Ok(self.with_storage(storage))
    }

    fn with_storage(&self, storage: Storage<'a>) -> Self {
        let base = match &storage {
            Storage::Owned(alloc) => alloc.ptr(),
            Storage::Borrowed(_) => self.base,
        };
        Self {
            base,
            dim: self.dim,
            stride: self.stride,
            storage,
            _marker: PhantomData,
        }
    }

    #[inline]
    fn assert_in_bounds(&self, i: usize, j: usize) {
        assert!(
            i < self.dim.width && j < self.dim.height,
            "element ({i}, {j}) is outside {}x{}",
            self.dim.width,
            self.dim.height
        );
    }
}

impl<T: Pixel> Clone for StridedBuffer<'_, T> {
    fn clone(&self) -> Self {
        match self.try_clone() {
            Ok(copy) => copy,
            Err(_) => match &self.storage {
                Storage::Owned(alloc) => std::alloc::handle_alloc_error(alloc.layout()),
                Storage::Borrowed(_) => unreachable!("borrowed duplication does not allocate"),
            },
        }
    }
}

impl<T: Pixel> fmt::Debug for StridedBuffer<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StridedBuffer")
            .field("base", &self.base)
            .field("width", &self.dim.width)
            .field("height", &self.dim.height)
            .field("stride", &self.stride)
            .field("owned", &self.owns_storage())
            .finish()
    }
}

fn size_overflow<T>(dim: Dimension) -> BufferError {
    BufferError::SizeOverflow {
        width: dim.width,
        height: dim.height,
        elem_size: size_of::<T>(),
    }
}

/// Row length and total byte size of a dense `dim` region.
fn dense_bytes<T>(dim: Dimension) -> Result<(usize, usize), BufferError> {
    let overflow = || size_overflow::<T>(dim);
    let row_bytes = dim.width.checked_mul(size_of::<T>()).ok_or_else(overflow)?;
    let bytes = dim
        .checked_area()
        .and_then(|area| area.checked_mul(size_of::<T>()))
        .ok_or_else(overflow)?;
    Ok((row_bytes, bytes))
}

/// Byte length of a row of `width` elements, panicking on overflow.
fn row_bytes_of<T>(width: usize) -> usize {
    width
        .checked_mul(size_of::<T>())
        .unwrap_or_else(|| panic!("row of {width} elements overflows usize"))
}

/// Bytes from the first row start to the end of the last row's content.
pub(crate) fn footprint_bytes(dim: Dimension, stride: usize, row_bytes: usize) -> Option<usize> {
    if dim.is_empty() {
        return Some(0);
    }
    (dim.height - 1).checked_mul(stride)?.checked_add(row_bytes)
}
