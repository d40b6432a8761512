//! Conversions between typed values and their stored text form.
//!
//! # Reading numbers back (for beginners)
//!
//! Everything in an INI file is text, so a typed read has to parse.  The
//! rules here are strict about the *end* of the text and lenient about the
//! *start*:
//!
//! - Leading whitespace is skipped, then an optional `+` or `-`.
//! - Integers auto-detect their base: `0x1F` is hex, `017` is octal,
//!   everything else is decimal.
//! - The whole remaining text must be consumed.  `"123abc"` is rejected, not
//!   read as `123`.
//! - Out-of-range values are rejected rather than wrapped or clamped.
//!
//! Parsing is locale-independent: the decimal point is always `.`.
//!
//! A rejected parse is not an error at the store level; the caller's
//! default is returned instead.

/// Types that can be stored as an INI value.
pub trait ToIniValue {
    /// Renders the value in its canonical stored form.
    fn to_ini_value(&self) -> String;
}

/// Types that can be read back from an INI value.
pub trait FromIniValue: Sized {
    /// Parses `text`, returning `None` if it is not a complete, in-range value.
    fn from_ini_value(text: &str) -> Option<Self>;
}

// ── Text ──────────────────────────────────────────────────────────────────────

impl ToIniValue for str {
    fn to_ini_value(&self) -> String {
        self.to_string()
    }
}

impl ToIniValue for String {
    fn to_ini_value(&self) -> String {
        self.clone()
    }
}

impl<T: ToIniValue + ?Sized> ToIniValue for &T {
    fn to_ini_value(&self) -> String {
        (**self).to_ini_value()
    }
}

impl FromIniValue for String {
    fn from_ini_value(text: &str) -> Option<Self> {
        Some(text.to_string())
    }
}

// ── bool ──────────────────────────────────────────────────────────────────────

/// Stored as `1` / `0`.
impl ToIniValue for bool {
    fn to_ini_value(&self) -> String {
        (if *self { "1" } else { "0" }).to_string()
    }
}

/// Accepts `true` / `false` (any ASCII case) or any integer, non-zero
/// meaning `true`.
impl FromIniValue for bool {
    fn from_ini_value(text: &str) -> Option<Self> {
        let t = skip_leading_space(text);
        if t.eq_ignore_ascii_case("true") {
            Some(true)
        } else if t.eq_ignore_ascii_case("false") {
            Some(false)
        } else {
            i128::from_ini_value(t).map(|v| v != 0)
        }
    }
}

// ── Integers ──────────────────────────────────────────────────────────────────

/// Splits integer text into (negative, digits, radix).
///
/// Returns `None` if no digits follow the sign and prefix, or if any
/// character is not a digit of the detected radix.
fn split_integer(text: &str) -> Option<(bool, &str, u32)> {
    let t = skip_leading_space(text);
    let (negative, t) = match t.as_bytes().first() {
        Some(b'-') => (true, &t[1..]),
        Some(b'+') => (false, &t[1..]),
        _ => (false, t),
    };

    let (digits, radix) = if let Some(hex) = t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        (hex, 16)
    } else if t.len() > 1 && t.starts_with('0') {
        (&t[1..], 8)
    } else {
        (t, 10)
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    Some((negative, digits, radix))
}

macro_rules! impl_signed {
    ($($t:ty),*) => {$(
        impl ToIniValue for $t {
            fn to_ini_value(&self) -> String {
                self.to_string()
            }
        }

        impl FromIniValue for $t {
            fn from_ini_value(text: &str) -> Option<Self> {
                let (negative, digits, radix) = split_integer(text)?;
                if negative {
                    <$t>::from_str_radix(&format!("-{digits}"), radix).ok()
                } else {
                    <$t>::from_str_radix(digits, radix).ok()
                }
            }
        }
    )*};
}

macro_rules! impl_unsigned {
    ($($t:ty),*) => {$(
        impl ToIniValue for $t {
            fn to_ini_value(&self) -> String {
                self.to_string()
            }
        }

        /// A leading `-` is only accepted for zero.
        impl FromIniValue for $t {
            fn from_ini_value(text: &str) -> Option<Self> {
                let (negative, digits, radix) = split_integer(text)?;
                let v = <$t>::from_str_radix(digits, radix).ok()?;
                if negative && v != 0 {
                    return None;
                }
                Some(v)
            }
        }
    )*};
}

impl_signed!(i8, i16, i32, i64, i128, isize);
impl_unsigned!(u8, u16, u32, u64, u128, usize);

// ── Floats ────────────────────────────────────────────────────────────────────

macro_rules! impl_float {
    ($($t:ty),*) => {$(
        /// Written in the shortest form that reads back to the same value.
        impl ToIniValue for $t {
            fn to_ini_value(&self) -> String {
                self.to_string()
            }
        }

        impl FromIniValue for $t {
            fn from_ini_value(text: &str) -> Option<Self> {
                skip_leading_space(text).parse::<$t>().ok()
            }
        }
    )*};
}

impl_float!(f32, f64);

/// Skips the whitespace C's `isspace` recognises.
fn skip_leading_space(text: &str) -> &str {
    text.trim_start_matches([' ', '\t', '\n', '\r', '\x0B', '\x0C'])
}
