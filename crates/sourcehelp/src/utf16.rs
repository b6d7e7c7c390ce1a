/// Convert a UTF-16 column offset (from LSP Position.character) to a char
/// offset within the given line. Columns past the end clamp to the line
/// length; a column landing inside a surrogate pair rounds up to the next
/// char.
pub fn utf16_column_to_char_offset(line: &str, utf16_col: u32) -> usize {
    let mut utf16_count = 0;
    for (char_idx, ch) in line.chars().enumerate() {
        if utf16_count >= utf16_col as usize {
            return char_idx;
        }
        utf16_count += ch.len_utf16();
    }
    line.chars().count()
}
