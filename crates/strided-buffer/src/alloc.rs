//! Aligned owned storage.

use std::alloc::Layout;
use std::ptr::NonNull;

use crate::BufferError;

/// Base alignment in bytes of every owned buffer.
pub const BUFFER_ALIGN: usize = 64;

/// A zero-initialized, `BUFFER_ALIGN`-aligned heap block released exactly
/// once, on drop.
///
/// Zero-sized blocks never touch the allocator and hold an aligned dangling
/// pointer.
pub(crate) struct AlignedAlloc {
    ptr: NonNull<u8>,
    layout: Layout,
}

impl AlignedAlloc {
    pub(crate) fn zeroed(bytes: usize) -> Result<Self, BufferError> {
        let layout = layout_for(bytes)?;
        if bytes == 0 {
            return Ok(Self {
                ptr: dangling(),
                layout,
            });
        }

        // SAFETY: `layout` has a non-zero size.
        let raw = unsafe { std::alloc::alloc_zeroed(layout) };
        let ptr = NonNull::new(raw).ok_or(BufferError::AllocationFailed {
            bytes,
            align: BUFFER_ALIGN,
        })?;
        log::debug!("allocated {bytes} bytes at {ptr:p}");
        Ok(Self { ptr, layout })
    }

    /// Allocates a new block of the same size and copies the contents.
    pub(crate) fn try_clone(&self) -> Result<Self, BufferError> {
        let copy = Self::zeroed(self.len())?;
        // SAFETY: both blocks are valid for `len` bytes and distinct allocations.
        unsafe {
            std::ptr::copy_nonoverlapping(self.ptr.as_ptr(), copy.ptr.as_ptr(), self.len());
        }
        Ok(copy)
    }

    #[inline]
    pub(crate) fn ptr(&self) -> NonNull<u8> {
        self.ptr
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.layout.size()
    }

    #[inline]
    pub(crate) fn layout(&self) -> Layout {
        self.layout
    }
}

impl Drop for AlignedAlloc {
    fn drop(&mut self) {
        if self.layout.size() == 0 {
            return;
        }
        log::debug!("releasing {} bytes at {:p}", self.layout.size(), self.ptr);
        // SAFETY: `ptr` came from `alloc_zeroed` with exactly this layout and
        // is released nowhere else.
        unsafe { std::alloc::dealloc(self.ptr.as_ptr(), self.layout) }
    }
}

fn layout_for(bytes: usize) -> Result<Layout, BufferError> {
    Layout::from_size_align(bytes, BUFFER_ALIGN).map_err(|_| BufferError::AllocationFailed {
        bytes,
        align: BUFFER_ALIGN,
    })
}

fn dangling() -> NonNull<u8> {
    let ptr = std::ptr::without_provenance_mut::<u8>(BUFFER_ALIGN);
    // SAFETY: BUFFER_ALIGN is non-zero.
    unsafe { NonNull::new_unchecked(ptr) }
}
