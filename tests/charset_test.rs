use std::collections::HashSet;

use pocowebc::expand_char_filter;

#[test]
fn test_default_filter_expansion() {
    let expanded = expand_char_filter("A-Za-z0-9");
    assert_eq!(expanded.chars().count(), 62, "Should cover letters and digits");
    assert!(expanded.starts_with("ABC"));
    assert!(expanded.ends_with("789"));

    let unique: HashSet<char> = expanded.chars().collect();
    assert_eq!(unique.len(), 62, "Should not contain duplicates");
}

#[test]
fn test_overlapping_ranges_are_deduplicated() {
    assert_eq!(expand_char_filter("a-cb-d"), "abcd");
    assert_eq!(expand_char_filter("xx-z"), "xyz");
}

#[test]
fn test_reversed_range_is_kept_raw() {
    assert_eq!(expand_char_filter("Z-A"), "Z-A");
    assert_eq!(expand_char_filter("0-9Z-A"), "0123456789Z-A");
}

#[test]
fn test_non_ascii_ranges() {
    assert_eq!(expand_char_filter("ä-æ"), "äåæ");
    assert_eq!(expand_char_filter("ſß"), "ſß");
}
