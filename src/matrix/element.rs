use num_traits::Float;

pub trait Element:  // Avoid repeating all the traits
    Float
    + Default
    + std::iter::Sum<Self>
    + std::fmt::Display
    + std::fmt::Debug
    + Send
    + Sync
    + 'static
{
}

impl<T> Element for T where
    T: Float
        + Default
        + std::iter::Sum<T>
        + std::fmt::Display
        + std::fmt::Debug
        + Send
        + Sync
        + 'static
{
}

/// Widening rule for mixed-width operands: the result of combining a `Self`
/// with a `W` is stored as `Output`, the wider of the two.
pub trait Promote<W: Element>: Element {
    type Output: Element + From<Self> + From<W>;

    #[inline(always)]
    fn widen_lhs(value: Self) -> <Self as Promote<W>>::Output {
        <<Self as Promote<W>>::Output as From<Self>>::from(value)
    }

    #[inline(always)]
    fn widen_rhs(value: W) -> <Self as Promote<W>>::Output {
        <<Self as Promote<W>>::Output as From<W>>::from(value)
    }
}

/// Element type produced by combining a `V` with a `W`.
pub type Promoted<V, W> = <V as Promote<W>>::Output;

macro_rules! impl_promote {
    ($($lhs:ty, $rhs:ty => $output:ty);* $(;)?) => {
        $(
            impl Promote<$rhs> for $lhs {
                type Output = $output;
            }
        )*
    };
}

impl_promote! {
    f32, f32 => f32;
    f32, f64 => f64;
    f64, f32 => f64;
    f64, f64 => f64;
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------
