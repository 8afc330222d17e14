//! Fixed-point decimal arithmetic for fill sequences.
//!
//! Values are an `i128` mantissa with a base-10 scale, so `0.1 + 0.2` is
//! exactly `0.3` and stepping never accumulates binary rounding noise.

use std::cmp::Ordering;
use std::fmt;

use serde_json::{Number, Value};

/// Extra fractional digits allowed when a division does not terminate.
const MAX_EXTRA_SCALE: u32 = 10;

/// Largest scale accepted from input.
const MAX_SCALE: u32 = 18;

/// Digits an `i128` mantissa always holds.
const MAX_PRECISION: u32 = 38;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decimal {
    mantissa: i128,
    scale: u32,
}

impl Decimal {
    fn from_int(n: i128) -> Self {
        Self { mantissa: n, scale: 0 }
    }

    /// Parse a decimal literal: optional sign, digits with an optional
    /// fractional part, and an optional `e`/`E` exponent.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let (body, exponent) = match text.find(['e', 'E']) {
            Some(pos) => (&text[..pos], text[pos + 1..].parse::<i32>().ok()?),
            None => (text, 0),
        };

        let (negative, digits) = match body.as_bytes().first()? {
            b'-' => (true, &body[1..]),
            b'+' => (false, &body[1..]),
            _ => (false, body),
        };
        let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
            return None;
        }

        let mut mantissa: i128 = 0;
        for b in int_part.bytes().chain(frac_part.bytes()) {
            mantissa = mantissa.checked_mul(10)?.checked_add((b - b'0') as i128)?;
        }
        if negative {
            mantissa = -mantissa;
        }

        if mantissa == 0 {
            return Some(Self::from_int(0));
        }

        let mut scale = frac_part.len() as i64 - exponent as i64;
        if scale > MAX_PRECISION as i64 {
            return None;
        }
        while scale < 0 {
            mantissa = mantissa.checked_mul(10)?;
            scale += 1;
        }
        let mut value = Self { mantissa, scale: scale as u32 }.normalized();
        if value.scale > MAX_SCALE {
            value = value.rescale_rounded(MAX_SCALE);
        }
        Some(value)
    }

    pub fn is_integer(&self) -> bool {
        self.normalized().scale == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        let (a, b, scale) = Self::align(self, other)?;
        Some(Self { mantissa: a.checked_add(b)?, scale }.normalized())
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        let (a, b, scale) = Self::align(self, other)?;
        Some(Self { mantissa: a.checked_sub(b)?, scale }.normalized())
    }

    pub fn checked_mul_int(self, n: i128) -> Option<Self> {
        Some(Self { mantissa: self.mantissa.checked_mul(n)?, scale: self.scale }.normalized())
    }

    /// Divide by an integer. Non-terminating results are rounded half away
    /// from zero after at most `MAX_EXTRA_SCALE` extra digits.
    pub fn checked_div_int(self, divisor: i128) -> Option<Self> {
        if divisor == 0 {
            return None;
        }
        let mut mantissa = self.mantissa;
        let mut scale = self.scale;
        for _ in 0..MAX_EXTRA_SCALE {
            if mantissa % divisor == 0 {
                break;
            }
            mantissa = mantissa.checked_mul(10)?;
            scale += 1;
        }
        let quotient = mantissa / divisor;
        let remainder = mantissa % divisor;
        let rounded = if remainder.abs() * 2 >= divisor.abs() {
            quotient + if (mantissa < 0) != (divisor < 0) { -1 } else { 1 }
        } else {
            quotient
        };
        Some(Self { mantissa: rounded, scale }.normalized())
    }

    /// Value as a JSON number: an integer when there is no fractional part.
    pub fn to_json(&self) -> Value {
        let n = self.normalized();
        if n.is_integer() {
            if let Ok(i) = i64::try_from(n.mantissa) {
                return Value::Number(i.into());
            }
        }
        n.to_string()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }

    fn align(a: Self, b: Self) -> Option<(i128, i128, u32)> {
        match a.scale.cmp(&b.scale) {
            Ordering::Equal => Some((a.mantissa, b.mantissa, a.scale)),
            Ordering::Less => {
                let factor = 10i128.checked_pow(b.scale - a.scale)?;
                Some((a.mantissa.checked_mul(factor)?, b.mantissa, b.scale))
            }
            Ordering::Greater => {
                let factor = 10i128.checked_pow(a.scale - b.scale)?;
                Some((a.mantissa, b.mantissa.checked_mul(factor)?, a.scale))
            }
        }
    }

    fn normalized(self) -> Self {
        let mut n = self;
        while n.scale > 0 && n.mantissa % 10 == 0 {
            n.mantissa /= 10;
            n.scale -= 1;
        }
        n
    }

    fn rescale_rounded(self, scale: u32) -> Self {
        if self.scale <= scale {
            return self;
        }
        let divisor = 10i128.pow(self.scale - scale);
        let quotient = self.mantissa / divisor;
        let remainder = self.mantissa % divisor;
        let rounded = if remainder.abs() * 2 >= divisor {
            quotient + self.mantissa.signum()
        } else {
            quotient
        };
        Self { mantissa: rounded, scale }.normalized()
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.mantissa);
        }
        let sign = if self.mantissa < 0 { "-" } else { "" };
        let digits = self.mantissa.unsigned_abs().to_string();
        let scale = self.scale as usize;
        let padded = if digits.len() <= scale {
            format!("{}{}", "0".repeat(scale - digits.len() + 1), digits)
        } else {
            digits
        };
        let (int_part, frac_part) = padded.split_at(padded.len() - scale);
        write!(f, "{}{}.{}", sign, int_part, frac_part)
    }
}
