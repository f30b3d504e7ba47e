//! # Partition Names
//!
//! The metastore identifies a partition by a path-like name built from its key
//! values: `region=us/dt=2018-08-30`. Keys are lower-cased, keys and values are
//! escaped so that `/` and `=` never appear inside a component, and a null value is
//! written as [`HIVE_DEFAULT_PARTITION_VALUE`].
//!
//! This module only handles the textual layer. Decoding the value text into typed
//! values happens in the pruner, which knows the column types.

/// Value text written for a null (or empty) partition value.
pub const HIVE_DEFAULT_PARTITION_VALUE: &str = "__HIVE_DEFAULT_PARTITION__";

fn needs_escape(c: char) -> bool {
    matches!(
        c,
        '\u{01}'..='\u{1F}'
            | '"'
            | '#'
            | '%'
            | '\''
            | '*'
            | '/'
            | ':'
            | '='
            | '?'
            | '\\'
            | '\u{7F}'
            | '{'
            | '['
            | ']'
            | '^'
    )
}

/// Escape a key or value for use inside a partition name.
pub fn escape_path_name(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len());
    for c in name.chars() {
        if needs_escape(c) {
            escaped.push_str(&format!("%{:02X}", c as u32));
        } else {
            escaped.push(c);
        }
    }
    escaped
}

/// Reverse [`escape_path_name`]. A `%` not followed by two hex digits is kept as is.
pub fn unescape_path_name(name: &str) -> String {
    let bytes = name.as_bytes();
    let mut out = String::with_capacity(name.len());
    let mut i = 0;
    let mut literal_start = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && bytes[i + 1].is_ascii_hexdigit()
            && bytes[i + 2].is_ascii_hexdigit()
        {
            if let Ok(code) = u8::from_str_radix(&name[i + 1..i + 3], 16) {
                out.push_str(&name[literal_start..i]);
                out.push(code as char);
                i += 3;
                literal_start = i;
                continue;
            }
        }
        i += 1;
    }
    out.push_str(&name[literal_start..]);
    out
}

/// Build a partition name from `(key, value)` pairs; `None` values become the
/// default partition.
pub fn make_partition_name<'a>(
    parts: impl IntoIterator<Item = (&'a str, Option<&'a str>)>,
) -> String {
    let segments: Vec<String> = parts
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                Some(v) if !v.is_empty() => escape_path_name(v),
                _ => HIVE_DEFAULT_PARTITION_VALUE.to_string(),
            };
            format!("{}={}", escape_path_name(&key.to_ascii_lowercase()), value)
        })
        .collect();
    segments.join("/")
}

/// One `key=value` component of a partition name after unescaping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionKeyValue {
    pub key: String,
    /// `None` for the default (null) partition.
    pub value: Option<String>,
}

/// Split a partition name into its key/value components. The empty name is the
/// single partition of an unpartitioned table and has no components.
///
/// On failure returns a human-readable reason.
pub fn to_partition_values(name: &str) -> Result<Vec<PartitionKeyValue>, String> {
    if name.is_empty() {
        return Ok(Vec::new());
    }
    name.split('/')
        .map(|segment| {
            let (key, value) = segment
                .split_once('=')
                .ok_or_else(|| format!("segment '{}' is not of the form key=value", segment))?;
            if key.is_empty() {
                return Err(format!("segment '{}' has an empty key", segment));
            }
            let value = if value == HIVE_DEFAULT_PARTITION_VALUE {
                None
            } else {
                Some(unescape_path_name(value))
            };
            Ok(PartitionKeyValue {
                key: unescape_path_name(key),
                value,
            })
        })
        .collect()
}
