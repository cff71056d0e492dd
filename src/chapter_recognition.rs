//! Chapter number recognition from display names.
//!
//! Handles Vietnamese and English chapter naming, e.g. `Chương 12`,
//! `Chap 12.5`, `Ch.12a` or `Vol.2 Chapter 3 Extra`.

use regex::Regex;
use std::sync::LazyLock;

/// Value used when no number can be recognised.
pub const UNKNOWN_CHAPTER: f32 = -1.0;

/// Number following a chapter keyword.
static KEYWORD_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:chương|chuong|chapter|chap|ch)\.?\s*(\d+(?:[.,]\d+)?)([a-h]\b)?(\s*(?:extra|omake)\b)?").unwrap()
});

/// Volume markers, removed before falling back to the first bare number.
static VOLUME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:volume|vol|tập|quyển)\.?\s*\d+").unwrap());

/// Any number, with the same optional suffixes.
static ANY_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:[.,]\d+)?)([a-h]\b)?(\s*(?:extra|omake)\b)?").unwrap()
});

/// Recognises the chapter number in a chapter name.
///
/// Returns [`UNKNOWN_CHAPTER`] when the name holds no number.
pub fn parse_chapter_number(name: &str) -> f32 {
    let name = name.to_lowercase();

    if let Some(caps) = KEYWORD_NUMBER.captures(&name) {
        return number_from_captures(&caps);
    }

    let without_volume = VOLUME.replace_all(&name, " ");
    ANY_NUMBER
        .captures(&without_volume)
        .map(|caps| number_from_captures(&caps))
        .unwrap_or(UNKNOWN_CHAPTER)
}

fn number_from_captures(caps: &regex::Captures<'_>) -> f32 {
    let raw = caps[1].replace(',', ".");
    let Ok(mut number) = raw.parse::<f32>() else {
        return UNKNOWN_CHAPTER;
    };

    if caps.get(3).is_some() {
        return number + 0.99;
    }

    // A letter suffix only refines whole numbers: 12a -> 12.1
    if let Some(letter) = caps.get(2) {
        if !raw.contains('.') {
            let offset = letter.as_str().as_bytes()[0] - b'a' + 1;
            number += f32::from(offset) / 10.0;
        }
    }

    number
}

/// Sorts chapters newest first by recognised number.
///
/// The sort is stable, so chapters sharing a number keep their order.
pub fn sort_descending<T>(items: &mut [T], number: impl Fn(&T) -> f32) {
    items.sort_by(|a, b| number(b).total_cmp(&number(a)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_number(name: &str, expected: f32) {
        let actual = parse_chapter_number(name);
        assert!(
            (actual - expected).abs() < 1e-4,
            "{name:?}: expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_keyword_numbers() {
        assert_number("Chương 12", 12.0);
        assert_number("Chap 7", 7.0);
        assert_number("Chapter 100: Kết thúc", 100.0);
        assert_number("Ch.45", 45.0);
        assert_number("Chuong 3", 3.0);
    }

    #[test]
    fn test_decimal_numbers() {
        assert_number("Chương 12.5", 12.5);
        assert_number("Chương 12,5", 12.5);
    }

    #[test]
    fn test_suffixes() {
        assert_number("Chap 12a", 12.1);
        assert_number("Chap 12b", 12.2);
        assert_number("Chương 5 Extra", 5.99);
        assert_number("Chapter 5 omake", 5.99);
        assert_number("Chapter 5 extraordinary", 5.0);
        assert_number("Chương 7 omakeboard", 7.0);
    }

    #[test]
    fn test_volume_is_skipped() {
        assert_number("Vol.2 Chương 5", 5.0);
        assert_number("Tập 3 - 14", 14.0);
    }

    #[test]
    fn test_bare_number_fallback() {
        assert_number("15", 15.0);
        assert_number("Oneshot 2", 2.0);
    }

    #[test]
    fn test_unknown() {
        assert_number("Oneshot", UNKNOWN_CHAPTER);
        assert_number("", UNKNOWN_CHAPTER);
    }

    #[test]
    fn test_sort_descending() {
        let mut numbers = vec![1.0_f32, 3.0, UNKNOWN_CHAPTER, 2.5, 10.0];
        sort_descending(&mut numbers, |n| *n);
        assert_eq!(numbers, vec![10.0, 3.0, 2.5, 1.0, UNKNOWN_CHAPTER]);
    }

    #[test]
    fn test_sort_is_stable() {
        let mut items = vec![("a", 1.0_f32), ("b", 2.0), ("c", 1.0)];
        sort_descending(&mut items, |(_, n)| *n);
        assert_eq!(items, vec![("b", 2.0), ("a", 1.0), ("c", 1.0)]);
    }
}
