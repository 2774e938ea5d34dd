use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::label::alphabet::{DIGITS, LETTERS, SYMBOLS, index_of};

const TIER_ONE: usize = LETTERS.len();
const TIER_TWO: usize = LETTERS.len() * DIGITS.len();
const TIER_THREE: usize = LETTERS.len() * DIGITS.len() * SYMBOLS.len();

/// Number of elements the tiered scheme can label in one session.
pub const DEFAULT_CAPACITY: usize = TIER_ONE + TIER_TWO + TIER_THREE;

/// Which alphabet(s) labels are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelScheme {
    /// Letters, then digit+letter pairs, then symbol+digit+letter triples
    #[default]
    Default,
    /// Bijective base-26 over lowercase letters
    CharactersOnly,
    /// Bijective base-10 over digits
    NumbersOnly,
}

impl LabelScheme {
    /// Largest number of distinct labels, `None` when unbounded.
    pub fn capacity(&self) -> Option<usize> {
        match self {
            LabelScheme::Default => Some(DEFAULT_CAPACITY),
            LabelScheme::CharactersOnly | LabelScheme::NumbersOnly => None,
        }
    }

    /// Labels of this scheme never prefix one another.
    pub fn is_prefix_free(&self) -> bool {
        matches!(self, LabelScheme::Default)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LabelScheme::Default => "default",
            LabelScheme::CharactersOnly => "characters_only",
            LabelScheme::NumbersOnly => "numbers_only",
        }
    }
}

impl fmt::Display for LabelScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LabelScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(LabelScheme::Default),
            "characters_only" => Ok(LabelScheme::CharactersOnly),
            "numbers_only" => Ok(LabelScheme::NumbersOnly),
            other => Err(format!("unknown label scheme '{}'", other)),
        }
    }
}

/// Label for the element at slot `index`.
///
/// Pure in `(index, scheme)`. Returns an empty string once the tiered
/// scheme runs past [`DEFAULT_CAPACITY`]; callers skip such elements.
pub fn label(index: usize, scheme: LabelScheme) -> String {
    match scheme {
        LabelScheme::Default => tiered(index),
        LabelScheme::CharactersOnly => bijective(index, LETTERS),
        LabelScheme::NumbersOnly => bijective(index, DIGITS),
    }
}

/// Slot index that `label` was generated from, if any.
pub fn decode(label: &str, scheme: LabelScheme) -> Option<usize> {
    match scheme {
        LabelScheme::Default => decode_tiered(label),
        LabelScheme::CharactersOnly => decode_bijective(label, LETTERS),
        LabelScheme::NumbersOnly => decode_bijective(label, DIGITS),
    }
}

fn tiered(index: usize) -> String {
    let (letters, digits, symbols) = (LETTERS.len(), DIGITS.len(), SYMBOLS.len());

    if index < TIER_ONE {
        return (LETTERS[index] as char).to_string();
    }

    // Two characters: digit then letter
    let index = index - TIER_ONE;
    if index < TIER_TWO {
        let letter = index / digits;
        let digit = index % digits;
        return [DIGITS[digit], LETTERS[letter]]
            .iter()
            .map(|&b| b as char)
            .collect();
    }

    // Three characters: symbol, digit, letter
    let index = index - TIER_TWO;
    if index < TIER_THREE {
        let letter = index / (digits * symbols);
        let digit = (index / symbols) % digits;
        let symbol = index % symbols;
        debug_assert!(letter < letters);
        return [SYMBOLS[symbol], DIGITS[digit], LETTERS[letter]]
            .iter()
            .map(|&b| b as char)
            .collect();
    }

    String::new()
}

fn decode_tiered(label: &str) -> Option<usize> {
    let chars: Vec<char> = label.chars().collect();
    match chars.as_slice() {
        [l] => index_of(LETTERS, *l),
        [d, l] => {
            let d = index_of(DIGITS, *d)?;
            let l = index_of(LETTERS, *l)?;
            Some(TIER_ONE + l * DIGITS.len() + d)
        }
        [s, d, l] => {
            let s = index_of(SYMBOLS, *s)?;
            let d = index_of(DIGITS, *d)?;
            let l = index_of(LETTERS, *l)?;
            Some(TIER_ONE + TIER_TWO + l * DIGITS.len() * SYMBOLS.len() + d * SYMBOLS.len() + s)
        }
        _ => None,
    }
}

/// Bijective base-N numeral, most significant digit first.
fn bijective(mut index: usize, alphabet: &[u8]) -> String {
    let base = alphabet.len();
    let mut digits = Vec::new();

    loop {
        digits.push(alphabet[index % base] as char);
        if index < base {
            break;
        }
        index = index / base - 1;
    }

    digits.iter().rev().collect()
}

fn decode_bijective(label: &str, alphabet: &[u8]) -> Option<usize> {
    if label.is_empty() {
        return None;
    }

    let base = alphabet.len();
    let mut value: usize = 0;
    for ch in label.chars() {
        let digit = index_of(alphabet, ch)?;
        value = value.checked_mul(base)?.checked_add(digit + 1)?;
    }
    Some(value - 1)
}
