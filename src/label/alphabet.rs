/// First-tier alphabet: lowercase letters.
pub const LETTERS: &[u8; 26] = b"abcdefghijklmnopqrstuvwxyz";

/// Second-tier alphabet: decimal digits.
pub const DIGITS: &[u8; 10] = b"0123456789";

/// Third-tier alphabet: fixed punctuation set.
pub const SYMBOLS: &[u8; 26] = b"!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Whether `ch` can appear in a label of any scheme.
pub fn is_label_char(ch: char) -> bool {
    ch.is_ascii_lowercase() || ch.is_ascii_digit() || (ch.is_ascii() && SYMBOLS.contains(&(ch as u8)))
}

/// Position of `ch` inside `alphabet`.
pub fn index_of(alphabet: &[u8], ch: char) -> Option<usize> {
    if !ch.is_ascii() {
        return None;
    }
    alphabet.iter().position(|&b| b == ch as u8)
}
