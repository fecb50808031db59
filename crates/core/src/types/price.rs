//! Type-safe price representation in integer minor units.

use core::fmt;
use core::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

/// A price in minor currency units (cents).
///
/// Catalog prices are stored and summed as integers; formatting into a
/// display string happens at the template boundary.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize, Hash,
)]
#[serde(transparent)]
pub struct Price(i64);

impl Price {
    /// A zero price.
    pub const ZERO: Self = Self(0);

    /// Create a price from an amount in minor units.
    #[must_use]
    pub const fn from_minor_units(cents: i64) -> Self {
        Self(cents)
    }

    /// Amount in minor units.
    #[must_use]
    pub const fn minor_units(&self) -> i64 {
        self.0
    }

    /// Multiply by a line quantity.
    #[must_use]
    pub const fn times(&self, quantity: i64) -> Self {
        Self(self.0 * quantity)
    }

    /// Format as a dollar amount, e.g. `$12.34`.
    #[must_use]
    pub fn display(&self) -> String {
        format!("${}.{:02}", self.0 / 100, (self.0 % 100).abs())
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Price {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl From<i64> for Price {
    fn from(cents: i64) -> Self {
        Self(cents)
    }
}

impl From<Price> for i64 {
    fn from(price: Price) -> Self {
        price.0
    }
}

// SQLx support (with sqlite feature)
#[cfg(feature = "sqlite")]
impl sqlx::Type<sqlx::Sqlite> for Price {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <i64 as sqlx::Type<sqlx::Sqlite>>::type_info()
    }

    fn compatible(ty: &sqlx::sqlite::SqliteTypeInfo) -> bool {
        <i64 as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
    }
}

#[cfg(feature = "sqlite")]
impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for Price {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let cents = <i64 as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        Ok(Self(cents))
    }
}

#[cfg(feature = "sqlite")]
impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i64 as sqlx::Encode<'q, sqlx::Sqlite>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_formats_cents() {
        assert_eq!(Price::from_minor_units(1000).display(), "$10.00");
        assert_eq!(Price::from_minor_units(5).display(), "$0.05");
        assert_eq!(Price::from_minor_units(123_45).display(), "$123.45");
    }

    #[test]
    fn test_times_and_sum() {
        let line = Price::from_minor_units(1000).times(3);
        assert_eq!(line.minor_units(), 3000);

        let mut total = Price::ZERO;
        total += line;
        total += Price::from_minor_units(250);
        assert_eq!(total, Price::from_minor_units(3250));
    }
}
