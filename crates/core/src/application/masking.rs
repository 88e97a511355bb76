// Sensitive field masking for read-path responses

use serde_json::Value;

/// Replacement character for masked digits
pub const MASK_CHAR: char = '*';

/// Number of trailing characters left visible
pub const VISIBLE_SUFFIX_LEN: usize = 4;

/// Dot-separated paths masked on every result read.
///
/// Masking happens on the read path only; the stored record keeps the
/// full extracted value.
pub const DEFAULT_MASK_PATHS: &[&str] = &["employee_info.ssn", "employer_info.ein"];

/// Mask the configured fields in a result payload.
///
/// Each path names a string leaf via dot-separated object keys. All but
/// the last four characters are replaced, preserving length (values of
/// four characters or fewer pass through unchanged). Paths that are
/// absent, or that resolve to a non-string, are skipped silently.
pub fn mask_sensitive_fields(value: &Value, paths: &[&str]) -> Value {
    let mut masked = value.clone();
    for path in paths {
        mask_path(&mut masked, path);
    }
    masked
}

fn mask_path(value: &mut Value, path: &str) {
    let mut current = value;
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        let Some(obj) = current.as_object_mut() else {
            return;
        };
        let Some(child) = obj.get_mut(segment) else {
            return;
        };
        if segments.peek().is_none() {
            if let Value::String(s) = child {
                *s = mask_string(s);
            }
            return;
        }
        current = child;
    }
}

fn mask_string(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= VISIBLE_SUFFIX_LEN {
        return s.to_string();
    }
    let masked_len = chars.len() - VISIBLE_SUFFIX_LEN;
    let mut out = String::with_capacity(s.len());
    for _ in 0..masked_len {
        out.push(MASK_CHAR);
    }
    out.extend(&chars[masked_len..]);
    out
}
