//! Every owned allocation is released exactly once, whatever order buffers
//! are duplicated, viewed and dropped in.
//!
//! A counting global allocator tallies only `BUFFER_ALIGN`-aligned requests,
//! which in this test binary come from owned buffers alone.

use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use strided_buffer::{Dimension, Point, StridedBuffer, BUFFER_ALIGN};

struct CountingAllocator;

static ALLOCS: AtomicUsize = AtomicUsize::new(0);
static FREES: AtomicUsize = AtomicUsize::new(0);
static SCOPE: Mutex<()> = Mutex::new(());

#[inline]
fn is_buffer(layout: Layout) -> bool {
    layout.align() == BUFFER_ALIGN
}

unsafe impl GlobalAlloc for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc(layout) };
        if !ptr.is_null() && is_buffer(layout) {
            ALLOCS.fetch_add(1, Ordering::SeqCst);
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc_zeroed(layout) };
        if !ptr.is_null() && is_buffer(layout) {
            ALLOCS.fetch_add(1, Ordering::SeqCst);
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        if is_buffer(layout) {
            FREES.fetch_add(1, Ordering::SeqCst);
        }
        unsafe { System.dealloc(ptr, layout) }
    }
}

#[global_allocator]
static GLOBAL: CountingAllocator = CountingAllocator;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Counts {
    allocs: usize,
    frees: usize,
}

/// Serializes tests and zeroes the counters for the caller's window.
fn scope() -> MutexGuard<'static, ()> {
    let guard = SCOPE.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    ALLOCS.store(0, Ordering::SeqCst);
    FREES.store(0, Ordering::SeqCst);
    guard
}

fn counts() -> Counts {
    Counts {
        allocs: ALLOCS.load(Ordering::SeqCst),
        frees: FREES.load(Ordering::SeqCst),
    }
}

#[test]
fn owner_chain_releases_each_allocation_once() {
    let _scope = scope();

    let first = StridedBuffer::<u16>::filled(Dimension::new(16, 8), 3).unwrap();
    assert_eq!(counts(), Counts { allocs: 1, frees: 0 });

    let second = first.clone();
    let third = second.try_clone().unwrap();
    assert_eq!(counts(), Counts { allocs: 3, frees: 0 });

    drop(second);
    assert_eq!(counts(), Counts { allocs: 3, frees: 1 });
    drop(first);
    drop(third);
    assert_eq!(counts(), Counts { allocs: 3, frees: 3 });
}

#[test]
fn views_and_their_duplicates_never_release() {
    let _scope = scope();

    let mut owner = StridedBuffer::<f32>::new(Dimension::new(10, 10)).unwrap();
    {
        let mut roi = owner.subview(Point::new(2, 2), Dimension::new(4, 4));
        let twin = roi.clone();
        let mut inner = roi.subview(Point::new(1, 1), Dimension::new(2, 2));
        inner.fill(1.5);
        let inner_twin = inner.clone();
        drop(inner);
        drop(twin);
        drop(inner_twin);
    }
    assert_eq!(counts(), Counts { allocs: 1, frees: 0 });

    drop(owner);
    assert_eq!(counts(), Counts { allocs: 1, frees: 1 });
}

#[test]
fn borrowed_buffers_never_touch_aligned_storage() {
    let _scope = scope();

    let mut data = vec![0u8; 64];
    {
        let view = StridedBuffer::from_slice(&mut data, Dimension::new(8, 8));
        let twin = view.clone();
        let _again = twin.try_clone().unwrap();
    }
    let mut bytes = Vec::new();
    {
        let view = StridedBuffer::<u32>::from_byte_vec(&mut bytes, Dimension::new(4, 4)).unwrap();
        let _twin = view.clone();
    }
    assert_eq!(counts(), Counts { allocs: 0, frees: 0 });
}

#[test]
fn empty_owner_allocates_nothing() {
    let _scope = scope();

    let empty = StridedBuffer::<u64>::new(Dimension::new(0, 32)).unwrap();
    let copy = empty.clone();
    drop(empty);
    drop(copy);
    assert_eq!(counts(), Counts { allocs: 0, frees: 0 });
}

#[test]
fn failed_allocation_leaves_nothing_behind() {
    let _scope = scope();

    let result = StridedBuffer::<u8>::new(Dimension::new(isize::MAX as usize, 1));
    assert!(result.is_err());
    assert_eq!(counts(), Counts { allocs: 0, frees: 0 });
}
