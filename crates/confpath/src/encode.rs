//! Address strings: segment joining and key escaping.

/// Append one segment to a path.
///
/// ```
/// use confpath::v1::join;
///
/// assert_eq!(join("", "interfaces"), "interfaces");
/// assert_eq!(join("interfaces", "interface"), "interfaces/interface");
/// ```
pub fn join(base: &str, segment: &str) -> String {
    if base.is_empty() {
        segment.to_string()
    } else {
        format!("{}/{}", base, segment)
    }
}

/// Address of one list member: `base/list=escaped-key`.
///
/// ```
/// use confpath::v1::encode_list_path;
///
/// assert_eq!(encode_list_path("", "items", "a/b"), "items=a%2Fb");
/// assert_eq!(
///     encode_list_path("interfaces", "interface", "eth0"),
///     "interfaces/interface=eth0"
/// );
/// ```
pub fn encode_list_path(base: &str, list: &str, key: &str) -> String {
    format!("{}={}", join(base, list), escape(key))
}

/// Percent-escape the characters that would be mistaken for separators
/// (`/` path, `,` multi-key, `:` module prefix) plus `%` itself.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '/' => out.push_str("%2F"),
            ',' => out.push_str("%2C"),
            ':' => out.push_str("%3A"),
            '%' => out.push_str("%25"),
            c => out.push(c),
        }
    }
    out
}

/// Inverse of [`escape`].
///
/// Any well-formed `%XX` sequence is decoded; a `%` not followed by two hex
/// digits is kept as-is.
///
/// ```
/// use confpath::v1::{decode, escape};
///
/// for v in ["a/b", "x,y:z", "100%", "plain"] {
///     assert_eq!(decode(&escape(v)), v);
/// }
/// ```
pub fn decode(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && let (Some(hi), Some(lo)) = (hex_digit(bytes[i + 1]), hex_digit(bytes[i + 2]))
        {
            out.push((hi << 4) | lo);
            i += 3;
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Split a `name=escaped-key` segment into the list name and decoded key.
///
/// Returns `None` when the segment carries no key.
pub fn split_list_segment(segment: &str) -> Option<(&str, String)> {
    let (name, key) = segment.split_once('=')?;
    Some((name, decode(key)))
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
