use super::*;

/// Advance past the current character
pub(super) fn bump(scanner: &mut Scanner) -> Option<char> {
    let curr = scanner.peek();
    if let Some(c) = curr {
        scanner.pos += c.len_utf8();
    }
    curr
}
