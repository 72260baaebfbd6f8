//! Short content hashes used as generated names.

/// 32-bit `h * 31 + unit` over the UTF-16 code units of `text`.
pub fn content_hash(text: &str) -> i32 {
    text.encode_utf16().fold(0i32, |h, unit| {
        (h << 5).wrapping_sub(h).wrapping_add(i32::from(unit))
    })
}

/// Formats the absolute value of `hash` in base 36.
pub fn to_base36(hash: i32) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    let mut value = i64::from(hash).unsigned_abs();
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

/// The class name generated for `text`.
pub fn class_name(text: &str) -> String {
    format!("c{}", to_base36(content_hash(text)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_hashes() {
        assert_eq!(content_hash(""), 0);
        assert_eq!(content_hash("a"), 97);
        assert_eq!(content_hash("ab"), 3105);
    }

    #[test]
    fn test_hash_wraps() {
        let long = "color: red;".repeat(50);
        // Must not overflow-panic in debug builds.
        let _ = content_hash(&long);
    }

    #[test]
    fn test_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(97), "2p");
        assert_eq!(to_base36(-97), "2p");
        assert_eq!(to_base36(i32::MIN), "zik0zk");
    }

    #[test]
    fn test_class_name() {
        assert_eq!(class_name("ab"), "c2e9");
    }
}
