use core::fmt;
use core::ops::{Add, AddAssign, Sub, SubAssign};
use serde::{Deserialize, Serialize};

/// A monetary amount in cents. Wrapping money in its own type keeps floats
/// out of bankroll and ledger state; every payout step rounds to a whole
/// cent, so a round settles to the exact sum of its per-bet payouts.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Whole-dollar constructor, the common case for table stakes.
    pub const fn from_dollars_whole(dollars: i64) -> Self {
        Money(dollars * 100)
    }

    /// Fractional dollars, rounded half up to the nearest cent.
    pub fn from_dollars(dollars: f64) -> Self {
        Money((dollars * 100.0).round() as i64)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub fn dollars(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Integer multiple, used for payout odds (e.g. stake × 12 for 11:1).
    pub const fn times(self, factor: i64) -> Money {
        Money(self.0 * factor)
    }

    /// `percent` percent of this amount, rounded half up.
    /// Only meaningful for non-negative amounts (stakes).
    pub const fn percent(self, percent: i64) -> Money {
        Money((self.0 * percent + 50) / 100)
    }

    /// Half of this amount, rounded half up.
    pub const fn halved(self) -> Money {
        Money((self.0 + 1) / 2)
    }

    pub const fn saturating_sub(self, other: Money) -> Money {
        let diff = self.0 - other.0;
        if diff < 0 { Money(0) } else { Money(diff) }
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        write!(f, "{sign}${}.{:02}", abs / 100, abs % 100)
    }
}
