//! Explicit rounding direction for fixed-point operations.

/// Rounding direction threaded through every invariant and balance
/// computation.
///
/// Pool math never rounds implicitly: callers pick the direction that
/// favours the pool (invariant rounded down before a mint, up before a
/// burn, and so on).
///
/// # Examples
///
/// ```
/// use balancer_maths::domain::Rounding;
///
/// let r = Rounding::Up;
/// assert!(r.is_up());
/// assert_eq!(r.opposite(), Rounding::Down);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rounding {
    /// Round towards positive infinity (ceiling).
    Up,
    /// Round towards zero (floor).
    Down,
}

impl Rounding {
    /// Returns `true` if this is [`Rounding::Up`].
    #[must_use]
    pub const fn is_up(&self) -> bool {
        matches!(self, Self::Up)
    }

    /// Returns `true` if this is [`Rounding::Down`].
    #[must_use]
    pub const fn is_down(&self) -> bool {
        matches!(self, Self::Down)
    }

    /// Returns the other direction.
    ///
    /// Quadratic-term helpers round some factors against the requested
    /// direction so the final value lands on the requested side.
    #[must_use]
    pub const fn opposite(&self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }
}
