//! Index element types accepted by the compressed-row arrays

/// An integer-valued element of a `ptr` or `indices` array
///
/// `f32` is accepted because the host matrix layer stores everything,
/// including index arrays, as single-precision buffers.
pub trait CsrIndex: Copy + Send + Sync + std::fmt::Debug + 'static {
    /// Convert to an offset without checking (kernel hot path)
    fn to_index(self) -> usize;

    /// Convert to an offset, or `None` if negative, fractional or non-finite
    fn checked_index(self) -> Option<usize>;

    /// Encode an offset
    fn from_index(i: usize) -> Self;
}

impl CsrIndex for f32 {
    #[inline(always)]
    fn to_index(self) -> usize {
        self as usize
    }

    fn checked_index(self) -> Option<usize> {
        (self.is_finite() && self >= 0.0 && self.fract() == 0.0).then_some(self as usize)
    }

    fn from_index(i: usize) -> Self {
        i as f32
    }
}

macro_rules! impl_csr_index_int {
    ($($t:ty),*) => {
        $(
            impl CsrIndex for $t {
                #[inline(always)]
                fn to_index(self) -> usize {
                    self as usize
                }

                fn checked_index(self) -> Option<usize> {
                    usize::try_from(self).ok()
                }

                fn from_index(i: usize) -> Self {
                    i as $t
                }
            }
        )*
    };
}

impl_csr_index_int!(i32, u32, i64, usize);
