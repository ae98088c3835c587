/// Recoverable failures of buffer construction and duplication.
///
/// Misuse of the buffer contract (mismatched copy dimensions, out-of-range
/// sub-views, strides shorter than a row) panics instead.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    #[error("{width}x{height} elements of {elem_size} bytes do not fit in memory")]
    SizeOverflow {
        width: usize,
        height: usize,
        elem_size: usize,
    },
    #[error("failed to allocate {bytes} bytes (align={align})")]
    AllocationFailed { bytes: usize, align: usize },
}
