use std::collections::HashSet;

/// Expands character ranges like `A-Za-z0-9` into the characters they
/// cover. A range whose start is after its end (`Z-A`) is kept as the three
/// literal characters. Every character appears only once, in the order it
/// was first produced.
pub fn expand_char_filter(filter: &str) -> String {
    let chars: Vec<char> = filter.chars().collect();
    let mut expanded = Vec::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        if i + 2 < chars.len() && chars[i + 1] == '-' {
            let (start, end) = (chars[i], chars[i + 2]);
            if start <= end {
                expanded.extend(start..=end);
            } else {
                expanded.extend_from_slice(&chars[i..i + 3]);
            }
            i += 3;
            continue;
        }
        expanded.push(chars[i]);
        i += 1;
    }
    let mut seen = HashSet::new();
    expanded.into_iter().filter(|c| seen.insert(*c)).collect()
}

/// Makes a text field safe for one-record-per-line, tab separated output.
pub fn sanitize_field(field: &str) -> String {
    field.replace(' ', "_").replace(['\t', '\n', '\r'], " ")
}

/// Like [`sanitize_field`] but keeps spaces, for line and token text.
pub fn sanitize_text(text: &str) -> String {
    text.replace(['\t', '\n', '\r'], " ")
}
