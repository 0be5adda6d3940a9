//! Exact currency amounts.
//!
//! Wraps `rust_decimal` so that comparisons between the two billing sources
//! are exact; `10.0` and `10.00` compare equal and no tolerance is applied.

use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;
use std::str::FromStr;

/// A currency amount held as an exact decimal.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use billing_recon::Currency;
///
/// let amount = Currency::from_str("1200.5").unwrap();
/// assert_eq!(amount.to_string(), "1200.50");
/// assert_eq!(amount.to_dollars(), "$1,200.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Currency(Decimal);

impl Currency {
    /// Number of decimal places used when rendering.
    pub const DISPLAY_SCALE: u32 = 2;

    /// Zero value.
    pub const ZERO: Self = Currency(Decimal::ZERO);

    /// Creates a new `Currency` from a `Decimal`.
    pub fn new(value: Decimal) -> Self {
        Currency(value)
    }

    /// Returns `true` if this value is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Renders the amount as `$` plus a thousands-grouped value with exactly
    /// two decimal places, e.g. `$1,200.50` or `-$3.10`.
    pub fn to_dollars(&self) -> String {
        let rounded = self.rounded();
        let digits = rounded.abs().to_string();
        let (whole, frac) = match digits.split_once('.') {
            Some(parts) => parts,
            None => (digits.as_str(), "00"),
        };

        let mut out = String::with_capacity(digits.len() + whole.len() / 3 + 2);
        if rounded.is_sign_negative() && !rounded.is_zero() {
            out.push('-');
        }
        out.push('$');
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                out.push(',');
            }
            out.push(ch);
        }
        out.push('.');
        out.push_str(frac);
        out
    }

    /// The value rounded half away from zero and padded to two places.
    fn rounded(&self) -> Decimal {
        let mut rounded = self
            .0
            .round_dp_with_strategy(Self::DISPLAY_SCALE, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(Self::DISPLAY_SCALE);
        rounded
    }
}

impl FromStr for Currency {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Decimal::from_str(s.trim()).map(Currency)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rounded())
    }
}
