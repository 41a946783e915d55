//! Raw-token converters.
//!
//! A converter maps an optional raw string to an optional [`Value`]. `None`
//! on the way in means "no value was supplied" (a negated flag); `None` on
//! the way out means "apply the default".

use crate::value::Value;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

type ConvertFn = dyn Fn(Option<&str>) -> Option<Value> + Send + Sync;

/// A conversion function paired with the type hint shown in help text.
#[derive(Clone)]
pub struct Converter {
    hint: Cow<'static, str>,
    func: Arc<ConvertFn>,
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter").field("hint", &self.hint).finish()
    }
}

impl Converter {
    /// A caller-supplied conversion.
    pub fn custom<F>(hint: impl Into<Cow<'static, str>>, func: F) -> Self
    where
        F: Fn(Option<&str>) -> Option<Value> + Send + Sync + 'static,
    {
        Self {
            hint: hint.into(),
            func: Arc::new(func),
        }
    }

    /// Identity. The empty string counts as absent, so `--name ""` behaves
    /// exactly like leaving `--name` out.
    pub fn string() -> Self {
        Self::custom("string", |raw| match raw {
            Some(s) if !s.is_empty() => Some(Value::String(s.to_string())),
            _ => None,
        })
    }

    /// Leading-float parse: `"12abc"` is 12, `"abc"` and `""` are NaN.
    pub fn number() -> Self {
        Self::custom("number", |raw| {
            raw.map(|s| Value::Number(parse_leading_float(s)))
        })
    }

    /// `false` for absent input and for the literal `"false"`, `true` for
    /// everything else (including `""` and `"0"`).
    pub fn boolean() -> Self {
        Self::custom("boolean", |raw| {
            Some(Value::Bool(!matches!(raw, None | Some("false"))))
        })
    }

    /// Comma-separated list, each piece run through `element`. Pieces that
    /// convert to absent are dropped. Absent or empty input stays absent.
    pub fn list(element: Converter) -> Self {
        let hint = format!("list<{}>", element.hint());
        Self::custom(hint, move |raw| match raw {
            Some(s) if !s.is_empty() => Some(Value::List(
                s.split(',')
                    .filter_map(|piece| element.convert(Some(piece)))
                    .collect(),
            )),
            _ => None,
        })
    }

    pub fn hint(&self) -> &str {
        &self.hint
    }

    pub fn convert(&self, raw: Option<&str>) -> Option<Value> {
        (self.func)(raw)
    }
}

/// Parse the longest numeric prefix of `s` after leading whitespace.
///
/// Accepts an optional sign, digits with an optional fraction, an optional
/// exponent, and `Infinity`. Returns NaN when no prefix parses.
pub fn parse_leading_float(s: &str) -> f64 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    if s[end..].starts_with("Infinity") {
        return if s.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return f64::NAN;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().unwrap_or(f64::NAN)
}
