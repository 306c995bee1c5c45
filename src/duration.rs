use std::fmt;

/// Error for the strict (anchored) duration form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationError {
    InvalidFormat,
}

impl fmt::Display for DurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DurationError::InvalidFormat => {
                write!(f, "invalid duration format (examples: 1 minute, 30 seconds, 1 min, 30 sec)")
            }
        }
    }
}

impl std::error::Error for DurationError {}

/// Strict duration parser used by the per-exercise rest override editor.
///
/// Accepts exactly `<int> minute(s)`, `<int> min`, `<int> second(s)` or
/// `<int> sec` (case-insensitive, whitespace-tolerant). A bare integer has
/// no unit and is rejected; callers keep the previous value on error.
pub fn parse_strict(input: &str) -> Result<u32, DurationError> {
    let text = input.trim().to_lowercase();

    let digits: String = text.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return Err(DurationError::InvalidFormat);
    }
    let value: u32 = digits.parse().map_err(|_| DurationError::InvalidFormat)?;

    let unit = text[digits.len()..].trim();
    match unit {
        "minute" | "minutes" | "min" => Ok(value * 60),
        "second" | "seconds" | "sec" => Ok(value),
        _ => Err(DurationError::InvalidFormat),
    }
}

/// Loose duration parser used for the program-level default rest field.
///
/// A unit word anywhere in the text wins: "min" means minutes, "sec" means
/// seconds, taking the first integer found. Without a unit the whole string
/// is tried as a number of seconds. Unparseable input falls back to 60
/// seconds; this form never errors.
pub fn parse_loose(input: &str) -> u32 {
    let text = input.trim().to_lowercase();
    if text.is_empty() {
        return 60;
    }

    if text.contains("min") {
        first_integer(&text).unwrap_or(1) * 60
    } else if text.contains("sec") {
        first_integer(&text).unwrap_or(60)
    } else {
        text.parse().unwrap_or(60)
    }
}

fn first_integer(text: &str) -> Option<u32> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}
