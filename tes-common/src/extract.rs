use thiserror::Error;

/// Failure scanning a response buffer for one field. Scoped to a single
/// field; the caller decides whether a missing field matters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("key \"{0}\" not found in response")]
    KeyNotFound(String),

    #[error("no string value follows key \"{0}\"")]
    MalformedField(String),

    #[error("value for key \"{0}\" is not a string")]
    NotAString(String),

    #[error("value for key \"{0}\" does not fit in {1} bytes")]
    Truncated(String, usize),
}

/// Extract the string value for `key` from a flat response buffer.
///
/// This is not a general JSON parser. It is built for the token exchange
/// service's response shape: it finds the first occurrence of the quoted key,
/// seeks the colon, skips whitespace and copies the quoted value that
/// follows. Only string values are supported.
///
/// Exactly two escape sequences are decoded, `\n` and `\t`; any other
/// character after a backslash is copied with the backslash dropped, so `\"`
/// yields a literal quote and the scan continues. This matches the subset of
/// escaping the service emits.
///
/// The decoded value is capped at `max_len - 1` bytes; a longer value fails
/// with `Truncated` rather than coming back clipped. The cap is checked
/// before every push, so the bound is never exceeded and a multi-byte
/// character is never split.
pub fn extract_string_field(text: &str, key: &str, max_len: usize) -> Result<String, ExtractError> {
    let pattern = format!("\"{}\"", key);
    let found = text
        .find(&pattern)
        .ok_or_else(|| ExtractError::KeyNotFound(key.to_string()))?;

    let after_key = &text[found + pattern.len()..];
    let colon = after_key
        .find(':')
        .ok_or_else(|| ExtractError::MalformedField(key.to_string()))?;

    let mut chars = after_key[colon + 1..].chars();

    // Skip whitespace, then require the opening quote of a string value.
    let mut next = chars.next();
    while matches!(next, Some(c) if c.is_ascii_whitespace()) {
        next = chars.next();
    }
    match next {
        Some('"') => {}
        Some(_) => return Err(ExtractError::NotAString(key.to_string())),
        None => return Err(ExtractError::MalformedField(key.to_string())),
    }

    let cap = max_len.saturating_sub(1);
    let mut value = String::new();
    loop {
        let decoded = match chars.next() {
            None => return Err(ExtractError::MalformedField(key.to_string())),
            Some('"') => return Ok(value),
            Some('\\') => match chars.next() {
                None => return Err(ExtractError::MalformedField(key.to_string())),
                Some('n') => '\n',
                Some('t') => '\t',
                Some(other) => other,
            },
            Some(c) => c,
        };
        if value.len() + decoded.len_utf8() > cap {
            return Err(ExtractError::Truncated(key.to_string(), max_len));
        }
        value.push(decoded);
    }
}
