//! Element types storable in a [`StridedBuffer`](crate::StridedBuffer).

/// Plain-data sample type.
///
/// Buffers read elements straight out of raw memory (zero-initialized owned
/// storage, caller byte vectors, arbitrary byte strides), so an element type
/// must accept whatever bytes it finds there.
///
/// # Safety
///
/// Implementors must be `Copy`, have no drop glue, and every bit pattern of
/// `size_of::<Self>()` bytes (all zeroes included) must be a valid value.
/// Types with padding bytes or niches (`bool`, `char`, references,
/// `NonZero*`) do not qualify.
pub unsafe trait Pixel: Copy + 'static {}

macro_rules! impl_pixel {
    ($($t:ty),* $(,)?) => {
        $(
            // SAFETY: primitive numeric type, every bit pattern is valid.
            unsafe impl Pixel for $t {}
        )*
    };
}

impl_pixel!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64);

// SAFETY: arrays have no padding between elements and inherit the element's
// validity.
unsafe impl<P: Pixel, const N: usize> Pixel for [P; N] {}
