use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

const TATWEEL: char = '\u{0640}';

/// Canonicalizes a word so orthographic noise does not affect comparison.
///
/// Applied in order:
/// 1. Lowercase (transliterated input)
/// 2. NFD decomposition, which splits hamza and madda carriers into a base
///    letter plus a combining mark
/// 3. Drop every combining mark (harakat, shadda, superscript alef, Quranic
///    annotation signs) and tatweel
/// 4. Unify letter shapes that are read the same (alef wasla, alef maqsura,
///    ta marbuta)
/// 5. Replace anything that is not a letter or digit with a space, then
///    collapse and trim whitespace
///
/// Total and idempotent: every string maps to something, possibly `""`.
pub fn normalize(raw: &str) -> String {
    raw.to_lowercase()
        .nfd()
        .filter(|&c| !is_combining_mark(c) && c != TATWEEL)
        .map(unify_letter)
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn unify_letter(c: char) -> char {
    match c {
        // alef wasla
        '\u{0671}' => '\u{0627}',
        // alef maqsura -> yeh
        '\u{0649}' => '\u{064A}',
        // farsi yeh -> yeh
        '\u{06CC}' => '\u{064A}',
        // ta marbuta -> heh
        '\u{0629}' => '\u{0647}',
        // keheh -> kaf
        '\u{06A9}' => '\u{0643}',
        _ => c,
    }
}
