use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CifError {
    #[error("Unterminated quoted value on line {line}")]
    UnterminatedQuote { line: usize },
    #[error("Unterminated ';' text field starting on line {line}")]
    UnterminatedTextField { line: usize },
    #[error("loop_ on line {line} declares no columns")]
    EmptyLoop { line: usize },
    #[error(
        "loop_ for '{category}' on line {line} has {values} values, not a multiple of its {columns} columns"
    )]
    RaggedLoop {
        category: String,
        line: usize,
        values: usize,
        columns: usize,
    },
    #[error("Tag '{tag}' on line {line} has no value")]
    MissingValue { tag: String, line: usize },
    #[error("Unexpected value on line {line} outside of a loop or tag")]
    StrayValue { line: usize },
    #[error("Malformed tag '{tag}' on line {line} (expected _category.field)")]
    MalformedTag { tag: String, line: usize },
}

/// A single CIF data value.
///
/// Bare `?` and `.` are the "unknown" and "not applicable" markers; the same characters
/// inside quotes are ordinary text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CifValue {
    Text(String),
    Unknown,
    Inapplicable,
}

impl CifValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CifValue::Text(s) => Some(s),
            CifValue::Unknown | CifValue::Inapplicable => None,
        }
    }
}

/// All values of one category, as rows over named columns.
///
/// Column names are stored lower-case without the category prefix; lookups are
/// case-insensitive.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CifTable {
    category: String,
    columns: Vec<String>,
    rows: Vec<Vec<CifValue>>,
}

impl CifTable {
    fn new(category: &str) -> Self {
        Self {
            category: category.to_string(),
            ..Default::default()
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        let name = name.to_ascii_lowercase();
        self.columns.iter().position(|c| *c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Text of `row`/`column`; `None` for missing columns and for `?`/`.` markers.
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.column_index(column)?;
        self.value_at(row, col)
    }

    pub fn value_at(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col)?.as_str()
    }

    pub fn rows(&self) -> impl Iterator<Item = CifRow<'_>> {
        (0..self.rows.len()).map(move |index| CifRow { table: self, index })
    }
}

/// Borrowed view of one table row.
#[derive(Debug, Clone, Copy)]
pub struct CifRow<'a> {
    table: &'a CifTable,
    index: usize,
}

impl<'a> CifRow<'a> {
    pub fn get(&self, column: &str) -> Option<&'a str> {
        self.table.get(self.index, column)
    }

    /// First present value among `columns`.
    pub fn first_of(&self, columns: &[&str]) -> Option<&'a str> {
        columns.iter().find_map(|c| self.get(c))
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

/// The first data block of a CIF file, indexed by category.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CifDocument {
    name: Option<String>,
    tables: HashMap<String, CifTable>,
}

impl CifDocument {
    pub fn parse(text: &str) -> Result<Self, CifError> {
        let tokens = tokenize(text)?;
        let mut doc = CifDocument::default();
        let mut iter = tokens.into_iter().peekable();

        while let Some(Spanned { token, line }) = iter.next() {
            match token {
                Token::DataBlock(name) => {
                    if doc.name.is_some() {
                        break;
                    }
                    doc.name = Some(name);
                }
                Token::Reserved => {}
                Token::Loop => {
                    let mut tags = Vec::new();
                    while let Some(Spanned {
                        token: Token::Tag(tag),
                        line,
                    }) = iter.next_if(|s| matches!(s.token, Token::Tag(_)))
                    {
                        tags.push(split_tag(&tag, line)?);
                    }
                    let Some((category, _)) = tags.first() else {
                        return Err(CifError::EmptyLoop { line });
                    };
                    let category = category.clone();

                    let mut values = Vec::new();
                    while let Some(Spanned {
                        token: Token::Value(v),
                        ..
                    }) = iter.next_if(|s| matches!(s.token, Token::Value(_)))
                    {
                        values.push(v);
                    }

                    let columns = tags.len();
                    if values.len() % columns != 0 {
                        return Err(CifError::RaggedLoop {
                            category,
                            line,
                            values: values.len(),
                            columns,
                        });
                    }

                    let mut table = CifTable::new(&category);
                    table.columns = tags.into_iter().map(|(_, field)| field).collect();
                    let mut row = Vec::with_capacity(columns);
                    for value in values {
                        row.push(value);
                        if row.len() == columns {
                            table.rows.push(std::mem::take(&mut row));
                        }
                    }
                    doc.tables.insert(category, table);
                }
                Token::Tag(tag) => {
                    let (category, field) = split_tag(&tag, line)?;
                    let value = match iter.next() {
                        Some(Spanned {
                            token: Token::Value(v),
                            ..
                        }) => v,
                        _ => return Err(CifError::MissingValue { tag, line }),
                    };
                    doc.insert_pair(&category, field, value);
                }
                Token::Value(_) => return Err(CifError::StrayValue { line }),
            }
        }

        Ok(doc)
    }

    fn insert_pair(&mut self, category: &str, field: String, value: CifValue) {
        let table = self
            .tables
            .entry(category.to_string())
            .or_insert_with(|| CifTable::new(category));
        if table.rows.is_empty() {
            table.rows.push(Vec::new());
        }
        match table.columns.iter().position(|c| *c == field) {
            Some(idx) => table.rows[0][idx] = value,
            None => {
                table.columns.push(field);
                table.rows[0].push(value);
            }
        }
    }

    /// Name of the data block (the text after `data_`).
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Looks up a category by name, with or without the leading underscore.
    pub fn table(&self, category: &str) -> Option<&CifTable> {
        let key = category.trim_start_matches('_').to_ascii_lowercase();
        self.tables.get(&key)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }
}

fn split_tag(tag: &str, line: usize) -> Result<(String, String), CifError> {
    let body = tag.trim_start_matches('_').to_ascii_lowercase();
    match body.split_once('.') {
        Some((category, field)) if !category.is_empty() && !field.is_empty() => {
            Ok((category.to_string(), field.to_string()))
        }
        _ => Err(CifError::MalformedTag {
            tag: tag.to_string(),
            line,
        }),
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    DataBlock(String),
    Loop,
    Tag(String),
    Value(CifValue),
    /// `save_`, `global_` and `stop_` frames, which carry no atom data.
    Reserved,
}

#[derive(Debug, Clone, PartialEq)]
struct Spanned {
    token: Token,
    line: usize,
}

fn tokenize(text: &str) -> Result<Vec<Spanned>, CifError> {
    let mut tokens = Vec::new();
    let mut text_field: Option<(usize, String)> = None;

    for (idx, raw_line) in text.lines().enumerate() {
        let line_no = idx + 1;

        if let Some((start, mut buf)) = text_field.take() {
            if let Some(rest) = raw_line.strip_prefix(';') {
                tokens.push(Spanned {
                    token: Token::Value(CifValue::Text(buf)),
                    line: start,
                });
                tokenize_line(rest, line_no, &mut tokens)?;
            } else {
                buf.push('\n');
                buf.push_str(raw_line);
                text_field = Some((start, buf));
            }
            continue;
        }

        if let Some(rest) = raw_line.strip_prefix(';') {
            text_field = Some((line_no, rest.trim_end().to_string()));
            continue;
        }

        tokenize_line(raw_line, line_no, &mut tokens)?;
    }

    if let Some((start, _)) = text_field {
        return Err(CifError::UnterminatedTextField { line: start });
    }
    Ok(tokens)
}

fn tokenize_line(line: &str, line_no: usize, out: &mut Vec<Spanned>) -> Result<(), CifError> {
    let bytes = line.as_bytes();
    let len = bytes.len();
    let mut i = 0;

    while i < len {
        let b = bytes[i];
        if b.is_ascii_whitespace() {
            i += 1;
            continue;
        }
        if b == b'#' {
            break;
        }

        if b == b'\'' || b == b'"' {
            // A quote only closes when followed by whitespace or the end of the line.
            let start = i + 1;
            let mut j = start;
            let end = loop {
                if j >= len {
                    return Err(CifError::UnterminatedQuote { line: line_no });
                }
                if bytes[j] == b && (j + 1 == len || bytes[j + 1].is_ascii_whitespace()) {
                    break j;
                }
                j += 1;
            };
            out.push(Spanned {
                token: Token::Value(CifValue::Text(line[start..end].to_string())),
                line: line_no,
            });
            i = end + 1;
            continue;
        }

        let start = i;
        while i < len && !bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let word = &line[start..i];
        out.push(Spanned {
            token: classify_word(word),
            line: line_no,
        });
    }
    Ok(())
}

fn classify_word(word: &str) -> Token {
    let lower = word.to_ascii_lowercase();
    if word.starts_with('_') {
        Token::Tag(word.to_string())
    } else if lower == "loop_" {
        Token::Loop
    } else if lower.starts_with("data_") {
        Token::DataBlock(word[5..].to_string())
    } else if lower.starts_with("save_") || lower == "global_" || lower == "stop_" {
        Token::Reserved
    } else if word == "?" {
        Token::Value(CifValue::Unknown)
    } else if word == "." {
        Token::Value(CifValue::Inapplicable)
    } else {
        Token::Value(CifValue::Text(word.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_loop_and_key_value_categories() {
        let text = "\
data_TEST
#
_entry.id TEST
_cell.length_a 10.5
loop_
_atom_site.group_PDB
_atom_site.label_atom_id
_atom_site.Cartn_x
ATOM N 1.0
ATOM CA 2.0
";
        let doc = CifDocument::parse(text).unwrap();
        assert_eq!(doc.name(), Some("TEST"));
        assert_eq!(doc.table("entry").unwrap().get(0, "id"), Some("TEST"));

        let atoms = doc.table("_atom_site").unwrap();
        assert_eq!(atoms.len(), 2);
        assert_eq!(atoms.columns(), &["group_pdb", "label_atom_id", "cartn_x"]);
        assert_eq!(atoms.get(1, "label_atom_id"), Some("CA"));
        assert_eq!(atoms.get(1, "Cartn_x"), Some("2.0"));
    }

    #[test]
    fn quotes_close_only_before_whitespace() {
        let text = "\
loop_
_chem.name
_chem.atom
'it's here' \"C4'\"
";
        let doc = CifDocument::parse(text).unwrap();
        let table = doc.table("chem").unwrap();
        assert_eq!(table.get(0, "name"), Some("it's here"));
        assert_eq!(table.get(0, "atom"), Some("C4'"));
    }

    #[test]
    fn bare_markers_are_missing_but_quoted_markers_are_text() {
        let text = "_x.a ?\n_x.b .\n_x.c '?'\n";
        let doc = CifDocument::parse(text).unwrap();
        let table = doc.table("x").unwrap();
        assert_eq!(table.get(0, "a"), None);
        assert_eq!(table.get(0, "b"), None);
        assert_eq!(table.get(0, "c"), Some("?"));
        assert!(table.has_column("a"));
    }

    #[test]
    fn loop_rows_may_span_lines_and_text_fields() {
        let text = "\
loop_
_oper.id
_oper.name
_oper.vector
1
;identity
operation
;
0.0
2 two 1.5
# trailing comment
";
        let doc = CifDocument::parse(text).unwrap();
        let table = doc.table("oper").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0, "name"), Some("identity\noperation"));
        assert_eq!(table.get(0, "vector"), Some("0.0"));
        assert_eq!(table.get(1, "name"), Some("two"));
    }

    #[test]
    fn comments_end_the_line_outside_values() {
        let doc = CifDocument::parse("_a.b value # comment\n_a.c '#not'\n").unwrap();
        let table = doc.table("a").unwrap();
        assert_eq!(table.get(0, "b"), Some("value"));
        assert_eq!(table.get(0, "c"), Some("#not"));
    }

    #[test]
    fn only_the_first_data_block_is_read() {
        let doc = CifDocument::parse("data_A\n_x.y 1\ndata_B\n_x.y 2\n").unwrap();
        assert_eq!(doc.name(), Some("A"));
        assert_eq!(doc.table("x").unwrap().get(0, "y"), Some("1"));
    }

    #[test]
    fn reports_structural_errors() {
        assert_eq!(
            CifDocument::parse("loop_\n_a.x\n_a.y\n1 2 3\n").unwrap_err(),
            CifError::RaggedLoop {
                category: "a".into(),
                line: 1,
                values: 3,
                columns: 2
            }
        );
        assert_eq!(
            CifDocument::parse("_a.x 'open\n").unwrap_err(),
            CifError::UnterminatedQuote { line: 1 }
        );
        assert_eq!(
            CifDocument::parse("_a.x\n;text\n").unwrap_err(),
            CifError::UnterminatedTextField { line: 2 }
        );
        assert!(matches!(
            CifDocument::parse("_a.x\n_a.y 1\n").unwrap_err(),
            CifError::MissingValue { .. }
        ));
        assert_eq!(
            CifDocument::parse("loop_\n1 2\n").unwrap_err(),
            CifError::EmptyLoop { line: 1 }
        );
    }

    #[test]
    fn row_view_resolves_fallback_columns() {
        let doc = CifDocument::parse("_s.auth_seq_id ?\n_s.label_seq_id 7\n").unwrap();
        let row = doc.table("s").unwrap().rows().next().unwrap();
        assert_eq!(row.first_of(&["auth_seq_id", "label_seq_id"]), Some("7"));
        assert_eq!(row.index(), 0);
    }
}
