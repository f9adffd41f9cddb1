//! Numeric literal parsing for command arguments

/// Parse an unsigned 32-bit number in the given radix
///
/// A radix of `0` auto-detects: a `0x` prefix selects hexadecimal,
/// anything else is decimal. Hexadecimal input may carry the `0x` prefix
/// either way. Digits may be upper or lower case. Returns `None` for empty
/// input, a digit outside the radix, or overflow.
pub fn parse_int(s: &str, radix: u32) -> Option<u32> {
    let (digits, radix) = match (radix, s.strip_prefix("0x")) {
        (0 | 16, Some(hex)) => (hex, 16),
        (0, None) => (s, 10),
        (r, _) => (s, r),
    };

    if digits.is_empty() || !(2..=36).contains(&radix) {
        return None;
    }

    digits.bytes().try_fold(0u32, |acc, c| {
        let digit = match c {
            b'0'..=b'9' => c - b'0',
            b'a'..=b'z' => c - b'a' + 10,
            b'A'..=b'Z' => c - b'A' + 10,
            _ => return None,
        } as u32;
        if digit >= radix {
            return None;
        }
        acc.checked_mul(radix)?.checked_add(digit)
    })
}
