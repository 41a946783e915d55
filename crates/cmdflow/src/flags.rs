//! Token classification and flag-name construction.

pub const LONG_PREFIX: &str = "--";
pub const SHORT_PREFIX: &str = "-";
pub const NEGATION_PREFIX: &str = "--no-";

fn starts_non_digit(rest: &str) -> bool {
    rest.chars().next().is_some_and(|c| !c.is_ascii_digit())
}

/// `--` followed by a non-digit (`--foo`, not `--1` or `--`).
pub fn is_long_flag(token: &str) -> bool {
    token
        .strip_prefix(LONG_PREFIX)
        .is_some_and(starts_non_digit)
}

/// `-` followed by exactly one character that is neither a digit nor `-`.
///
/// Negative numbers such as `-1` stay positional.
pub fn is_short_flag(token: &str) -> bool {
    let Some(rest) = token.strip_prefix(SHORT_PREFIX) else {
        return false;
    };
    let mut chars = rest.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c != '-' && !c.is_ascii_digit(),
        _ => false,
    }
}

/// `--no-` followed by a non-digit.
pub fn is_negated_flag(token: &str) -> bool {
    token
        .strip_prefix(NEGATION_PREFIX)
        .is_some_and(starts_non_digit)
}

pub fn is_flag(token: &str) -> bool {
    is_long_flag(token) || is_short_flag(token)
}

/// The option name a negated token refers to (`--no-color` -> `color`).
pub fn negation_target(token: &str) -> Option<&str> {
    if is_negated_flag(token) {
        token.strip_prefix(NEGATION_PREFIX)
    } else {
        None
    }
}

pub fn long(name: &str) -> String {
    format!("{LONG_PREFIX}{name}")
}

pub fn short(name: &str) -> String {
    format!("{SHORT_PREFIX}{name}")
}

pub fn negated(name: &str) -> String {
    format!("{NEGATION_PREFIX}{name}")
}
