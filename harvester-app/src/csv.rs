use std::io::{self, Write};

pub const SEPARATOR: char = ',';
/// Same terminator the common spreadsheet tools write.
pub const LINE_END: &str = "\r\n";

fn needs_quotes(field: &str, sep: char) -> bool {
    field.contains(sep) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Quote a field only when it would otherwise break the row.
pub fn escape_field(field: &str, sep: char) -> String {
    if needs_quotes(field, sep) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Write one row, terminator included.
pub fn write_row<W, S>(w: &mut W, row: &[S], sep: char) -> io::Result<()>
where
    W: Write,
    S: AsRef<str>,
{
    let line = row
        .iter()
        .map(|cell| escape_field(cell.as_ref(), sep))
        .collect::<Vec<_>>()
        .join(&sep.to_string());
    w.write_all(line.as_bytes())?;
    w.write_all(LINE_END.as_bytes())
}

/// Quote-aware reader for files produced by [`write_row`].
#[cfg(test)]
pub fn parse_rows(text: &str, sep: char) -> Vec<Vec<String>> {
    use std::mem::take;

    let mut rows = Vec::new();
    let mut field = String::new();
    let mut row = Vec::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.is_empty() => in_quotes = true,
            c if c == sep && !in_quotes => row.push(take(&mut field)),
            '\r' | '\n' if !in_quotes => {
                if ch == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                row.push(take(&mut field));
                rows.push(take(&mut row));
            }
            _ => field.push(ch),
        }
    }

    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }
    rows
}
