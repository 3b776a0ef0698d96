use serde_json;

/// Quotes arbitrary text for inclusion in an error message.
pub fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap()
}

/// The 1-based line and 0-based column of a byte offset in `src`.
pub fn position(src: &[u8], offset: usize) -> (usize, usize) {
    let offset = offset.min(src.len());
    let mut line = 1;
    let mut line_start = 0;

    for (i, &b) in src[..offset].iter().enumerate() {
        if b == b'\n' {
            line += 1;
            line_start = i + 1;
        }
    }
    (line, offset - line_start)
}

/// The source line containing `offset`, followed by a caret pointer at
/// the offending column.
pub fn excerpt(src: &[u8], offset: usize) -> String {
    let offset = offset.min(src.len());
    let start = src[..offset]
        .iter()
        .rposition(|&b| b == b'\n')
        .map(|i| i + 1)
        .unwrap_or(0);
    let end = src[offset..]
        .iter()
        .position(|&b| b == b'\n')
        .map(|i| offset + i)
        .unwrap_or(src.len());

    let line = String::from_utf8_lossy(&src[start..end]);
    let mut pointer = "-".repeat(offset - start);
    pointer.push('^');
    format!("{}\n{}", line.trim_end_matches('\r'), pointer)
}
