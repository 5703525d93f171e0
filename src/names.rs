//! Person-name resolution from file display names.
//!
//! Submitted files follow a loose convention: free text, then a
//! parenthetical, then the submitter's name, then an identifier code, e.g.
//! `"Essay 3 (2023) John Smith_A1b2_extra.pdf"`. The resolver keeps only the
//! name part:
//!
//! 1. Drop everything up to and including the last `)` (the whole string is
//!    used if there is none).
//! 2. Split on runs of `_`, whitespace, or `-`.
//! 3. Keep tokens until the first identifier code: an alphanumeric token
//!    that contains a digit and is not purely alphabetic. That token and
//!    everything after it are discarded.
//! 4. Join with single spaces and trim.
//! 5. If the first character is not alphabetic, drop that one character and
//!    trim again.
//!
//! "Alphabetic" means a letter category (`Lu Ll Lt Lm Lo`), so letter-like
//! numerals such as `Ⅷ` and combining marks are not letters. A "digit" is a
//! decimal digit or a digit-valued symbol (`²`, `①`); fractions and roman
//! numerals count as numeric but not as digits.
//!
//! The resolver never substitutes a placeholder itself; callers decide what
//! a missing name means.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_general_category::{get_general_category, GeneralCategory};

use crate::error::NameError;

static DELIMITERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[_\s-]+").expect("delimiter pattern is valid"));

/// Resolve a person's name from a display name.
pub fn resolve_name(display_name: &str) -> Result<String, NameError> {
    let working = match display_name.rfind(')') {
        Some(pos) => &display_name[pos + 1..],
        None => {
            tracing::debug!(file_name = display_name, "no ')' in file name, using full name");
            display_name
        }
    };

    let mut parts = Vec::new();
    for token in DELIMITERS.split(working) {
        if is_identifier_code(token) {
            break;
        }
        if !token.is_empty() {
            parts.push(token);
        }
    }

    let joined = parts.join(" ");
    let mut name = joined.trim();

    if let Some(first) = name.chars().next() {
        if !is_letter(first) {
            name = name[first.len_utf8()..].trim();
        }
    }

    if name.is_empty() {
        Err(NameError::NoName(display_name.to_string()))
    } else {
        Ok(name.to_string())
    }
}

fn is_identifier_code(token: &str) -> bool {
    !token.is_empty()
        && token.chars().all(|c| is_letter(c) || is_number(c))
        && !token.chars().all(is_letter)
        && token.chars().any(is_digit)
}

fn is_letter(c: char) -> bool {
    matches!(
        get_general_category(c),
        GeneralCategory::UppercaseLetter
            | GeneralCategory::LowercaseLetter
            | GeneralCategory::TitlecaseLetter
            | GeneralCategory::ModifierLetter
            | GeneralCategory::OtherLetter
    )
}

fn is_number(c: char) -> bool {
    matches!(
        get_general_category(c),
        GeneralCategory::DecimalNumber
            | GeneralCategory::LetterNumber
            | GeneralCategory::OtherNumber
    )
}

/// Decimal digits plus the symbols whose Unicode numeric type is `Digit`.
fn is_digit(c: char) -> bool {
    get_general_category(c) == GeneralCategory::DecimalNumber
        || DIGIT_SYMBOLS
            .iter()
            .any(|&(lo, hi)| (lo..=hi).contains(&c))
}

// Numeric_Type=Digit ranges from UnicodeData.txt (digit value without a
// decimal value).
const DIGIT_SYMBOLS: &[(char, char)] = &[
    ('\u{00B2}', '\u{00B3}'),
    ('\u{00B9}', '\u{00B9}'),
    ('\u{1369}', '\u{1371}'),
    ('\u{19DA}', '\u{19DA}'),
    ('\u{2070}', '\u{2070}'),
    ('\u{2074}', '\u{2079}'),
    ('\u{2080}', '\u{2089}'),
    ('\u{2460}', '\u{2468}'),
    ('\u{2474}', '\u{247C}'),
    ('\u{2488}', '\u{2490}'),
    ('\u{24EA}', '\u{24EA}'),
    ('\u{24F5}', '\u{24FD}'),
    ('\u{24FF}', '\u{24FF}'),
    ('\u{2776}', '\u{277E}'),
    ('\u{2780}', '\u{2788}'),
    ('\u{278A}', '\u{2792}'),
    ('\u{10A40}', '\u{10A43}'),
    ('\u{10E60}', '\u{10E68}'),
    ('\u{11052}', '\u{1105A}'),
    ('\u{1F100}', '\u{1F10A}'),
];

/// Split a resolved name into first name and the remainder.
///
/// The remainder is empty for single-word names.
pub fn split_name(name: &str) -> (String, String) {
    match name.split_once(' ') {
        Some((first, rest)) => (first.to_string(), rest.to_string()),
        None => (name.to_string(), String::new()),
    }
}
