//! Coercion strategies from resolved text to concrete field types.
//!
//! Units are fixed conventions:
//! - durations use nanoseconds as the base unit and accept `ns`, `us`/`µs`,
//!   `ms`, `s`, `m` and `h`, possibly chained (`1h30m`);
//! - byte sizes use binary multipliers for every suffix, so `512m`, `512mb`
//!   and `512mib` all mean 512 × 2^20 bytes.

use std::fmt;

use crate::error::CoerceError;

/// Conversion from resolved text to a field's concrete type.
pub trait Coerce {
    /// The concrete type produced by rendering.
    type Output: Clone + fmt::Debug + PartialEq;

    /// Type name used in error messages.
    const NAME: &'static str;

    /// Whether placeholders may be combined with other text in this field.
    const ACCEPTS_MIXED: bool = false;

    /// Whether the field keeps its source text verbatim.
    ///
    /// Unquoted YAML floats are rejected in such fields, since their original
    /// spelling (`1.10`, `1e3`) cannot be recovered from the parsed number.
    const VERBATIM: bool = false;

    /// Converts resolved text into the concrete type.
    ///
    /// # Errors
    ///
    /// Returns an error if the text has the wrong shape or overflows.
    fn coerce(text: &str) -> Result<Self::Output, CoerceError>;
}

/// Free-form text.
#[derive(Debug)]
pub struct Text;

/// `true` or `false`, ASCII case-insensitive.
#[derive(Debug)]
pub struct Bool;

/// Base-10 unsigned 64-bit integer.
#[derive(Debug)]
pub struct UInt64;

/// Duration with a mandatory unit suffix.
#[derive(Debug)]
pub struct Duration;

/// Byte count with an optional binary unit suffix.
#[derive(Debug)]
pub struct ByteSize;

impl Coerce for Text {
    type Output = String;
    const NAME: &'static str = "string";
    const ACCEPTS_MIXED: bool = true;
    const VERBATIM: bool = true;

    fn coerce(text: &str) -> Result<String, CoerceError> {
        Ok(text.to_string())
    }
}

impl Coerce for Bool {
    type Output = bool;
    const NAME: &'static str = "boolean";

    fn coerce(text: &str) -> Result<bool, CoerceError> {
        if text.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if text.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(CoerceError::mismatch("a boolean (true or false)", text))
        }
    }
}

impl Coerce for UInt64 {
    type Output = u64;
    const NAME: &'static str = "unsigned integer";

    fn coerce(text: &str) -> Result<u64, CoerceError> {
        if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CoerceError::mismatch("an unsigned base-10 integer", text));
        }
        text.parse::<u64>().map_err(|_| CoerceError::OutOfRange {
            value: text.to_string(),
            target: Self::NAME,
        })
    }
}

impl Coerce for Duration {
    type Output = std::time::Duration;
    const NAME: &'static str = "duration";

    fn coerce(text: &str) -> Result<std::time::Duration, CoerceError> {
        let mismatch =
            || CoerceError::mismatch("a duration with a unit such as 30s, 500ms or 1h30m", text);
        let overflow = || CoerceError::OutOfRange {
            value: text.to_string(),
            target: Self::NAME,
        };

        if text.is_empty() {
            return Err(mismatch());
        }

        let mut total: u128 = 0;
        let mut rest = text;
        while !rest.is_empty() {
            let (whole, fraction, after) = split_magnitude(rest).ok_or_else(mismatch)?;
            let unit_len = after
                .find(|c: char| c.is_ascii_digit() || c == '.')
                .unwrap_or(after.len());
            let (unit, next) = after.split_at(unit_len);
            let nanos_per_unit: u128 = match unit {
                "ns" => 1,
                "us" | "µs" | "μs" => 1_000,
                "ms" => 1_000_000,
                "s" => 1_000_000_000,
                "m" => 60_000_000_000,
                "h" => 3_600_000_000_000,
                _ => return Err(mismatch()),
            };
            let part = scale_magnitude(whole, fraction, nanos_per_unit).ok_or_else(overflow)?;
            total = total.checked_add(part).ok_or_else(overflow)?;
            rest = next;
        }

        let nanos = u64::try_from(total).map_err(|_| overflow())?;
        Ok(std::time::Duration::from_nanos(nanos))
    }
}

impl Coerce for ByteSize {
    type Output = u64;
    const NAME: &'static str = "byte size";

    fn coerce(text: &str) -> Result<u64, CoerceError> {
        let mismatch = || CoerceError::mismatch("a byte size such as 512m, 1.5g or 1024", text);
        let overflow = || CoerceError::OutOfRange {
            value: text.to_string(),
            target: Self::NAME,
        };

        let (whole, fraction, suffix) = split_magnitude(text).ok_or_else(mismatch)?;
        let multiplier: u128 = match suffix.to_ascii_lowercase().as_str() {
            "" | "b" => 1,
            "k" | "kb" | "kib" => 1 << 10,
            "m" | "mb" | "mib" => 1 << 20,
            "g" | "gb" | "gib" => 1 << 30,
            "t" | "tb" | "tib" => 1 << 40,
            "p" | "pb" | "pib" => 1 << 50,
            _ => return Err(mismatch()),
        };

        let bytes = scale_magnitude(whole, fraction, multiplier).ok_or_else(overflow)?;
        u64::try_from(bytes).map_err(|_| overflow())
    }
}

/// Digits of a fraction beyond this are below any unit's resolution.
const MAX_FRACTION_DIGITS: usize = 18;

/// Splits `12.5rest` into `("12", "5", "rest")`.
///
/// Returns `None` when the text does not start with a magnitude.
fn split_magnitude(text: &str) -> Option<(&str, &str, &str)> {
    let whole_len = text.bytes().take_while(u8::is_ascii_digit).count();
    let (whole, rest) = text.split_at(whole_len);

    let (fraction, rest) = match rest.strip_prefix('.') {
        Some(after_dot) => {
            let len = after_dot.bytes().take_while(u8::is_ascii_digit).count();
            if len == 0 {
                return None;
            }
            after_dot.split_at(len)
        }
        None => ("", rest),
    };

    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    Some((whole, fraction, rest))
}

/// Computes `whole.fraction × scale`, truncating below one unit.
///
/// Returns `None` on overflow.
fn scale_magnitude(whole: &str, fraction: &str, scale: u128) -> Option<u128> {
    let whole_value = if whole.is_empty() {
        0
    } else {
        whole.parse::<u128>().ok()?
    };
    let mut value = whole_value.checked_mul(scale)?;

    let fraction = &fraction[..fraction.len().min(MAX_FRACTION_DIGITS)];
    if !fraction.is_empty() {
        let digits = fraction.parse::<u128>().ok()?;
        let denominator = 10u128.checked_pow(u32::try_from(fraction.len()).ok()?)?;
        value = value.checked_add(digits.checked_mul(scale)? / denominator)?;
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration as StdDuration;

    #[test]
    fn test_bool_coercion() {
        assert_eq!(Bool::coerce("true"), Ok(true));
        assert_eq!(Bool::coerce("TRUE"), Ok(true));
        assert_eq!(Bool::coerce("False"), Ok(false));
        assert!(Bool::coerce("1").is_err());
        assert!(Bool::coerce("yes").is_err());
        assert!(Bool::coerce("").is_err());
    }

    #[test]
    fn test_uint64_coercion() {
        assert_eq!(UInt64::coerce("3"), Ok(3));
        assert_eq!(UInt64::coerce("18446744073709551615"), Ok(u64::MAX));
        assert!(matches!(UInt64::coerce("-1"), Err(CoerceError::Mismatch { .. })));
        assert!(matches!(UInt64::coerce("abc"), Err(CoerceError::Mismatch { .. })));
        assert!(matches!(UInt64::coerce("+3"), Err(CoerceError::Mismatch { .. })));
        assert!(matches!(UInt64::coerce(" 3"), Err(CoerceError::Mismatch { .. })));
        assert!(matches!(UInt64::coerce("3.0"), Err(CoerceError::Mismatch { .. })));
        assert!(matches!(
            UInt64::coerce("18446744073709551616"),
            Err(CoerceError::OutOfRange { target: "unsigned integer", .. })
        ));
    }

    #[test]
    fn test_duration_coercion() {
        assert_eq!(Duration::coerce("30s"), Ok(StdDuration::from_secs(30)));
        assert_eq!(Duration::coerce("500ms"), Ok(StdDuration::from_millis(500)));
        assert_eq!(Duration::coerce("1h30m"), Ok(StdDuration::from_secs(5400)));
        assert_eq!(Duration::coerce("1.5s"), Ok(StdDuration::from_millis(1500)));
        assert_eq!(Duration::coerce("10us"), Ok(StdDuration::from_micros(10)));
        assert_eq!(Duration::coerce("2m0s"), Ok(StdDuration::from_secs(120)));
    }

    #[test]
    fn test_duration_requires_unit() {
        assert!(matches!(Duration::coerce("30"), Err(CoerceError::Mismatch { .. })));
        assert!(matches!(Duration::coerce("30d"), Err(CoerceError::Mismatch { .. })));
        assert!(matches!(Duration::coerce("s"), Err(CoerceError::Mismatch { .. })));
        assert!(matches!(Duration::coerce(""), Err(CoerceError::Mismatch { .. })));
        assert!(matches!(Duration::coerce("-5s"), Err(CoerceError::Mismatch { .. })));
    }

    #[test]
    fn test_duration_overflow() {
        assert!(matches!(
            Duration::coerce("9999999999h"),
            Err(CoerceError::OutOfRange { target: "duration", .. })
        ));
    }

    #[test]
    fn test_byte_size_coercion() {
        assert_eq!(ByteSize::coerce("512m"), Ok(512 * 1024 * 1024));
        assert_eq!(ByteSize::coerce("512MB"), Ok(512 * 1024 * 1024));
        assert_eq!(ByteSize::coerce("1k"), Ok(1024));
        assert_eq!(ByteSize::coerce("1KiB"), Ok(1024));
        assert_eq!(ByteSize::coerce("1.5g"), Ok(1_610_612_736));
        assert_eq!(ByteSize::coerce("2048"), Ok(2048));
        assert_eq!(ByteSize::coerce("10b"), Ok(10));
    }

    #[test]
    fn test_byte_size_rejections() {
        assert!(matches!(ByteSize::coerce("lots"), Err(CoerceError::Mismatch { .. })));
        assert!(matches!(ByteSize::coerce("12x"), Err(CoerceError::Mismatch { .. })));
        assert!(matches!(ByteSize::coerce("-1m"), Err(CoerceError::Mismatch { .. })));
        assert!(matches!(
            ByteSize::coerce("99999999p"),
            Err(CoerceError::OutOfRange { target: "byte size", .. })
        ));
    }

    #[test]
    fn test_text_is_verbatim() {
        assert_eq!(Text::coerce(" keep  spaces "), Ok(String::from(" keep  spaces ")));
    }
}
