//! Wall clock abstraction for the data visualization patterns.

use time::OffsetDateTime;

/// Trait for abstracting the local wall clock.
pub trait WallClock {
    /// Current local date and time.
    fn now(&self) -> OffsetDateTime;

    /// Whether daylight saving time is in effect at [`now`](Self::now).
    ///
    /// `OffsetDateTime` only carries the offset, not the rule that produced
    /// it, so clocks that know their time zone should override this.
    fn is_dst(&self) -> bool {
        false
    }
}

impl<C: WallClock + ?Sized> WallClock for &C {
    fn now(&self) -> OffsetDateTime {
        (**self).now()
    }

    fn is_dst(&self) -> bool {
        (**self).is_dst()
    }
}
