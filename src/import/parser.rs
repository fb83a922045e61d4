//! Tabular parser for uploaded CSV and spreadsheet files
//!
//! Every file is turned into the same shape: normalized headers plus one
//! [`RowRecord`] per non-blank data row. All values are text.

use std::borrow::Cow;
use std::collections::HashSet;
use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use csv::ReaderBuilder;
use encoding_rs::{Encoding, UTF_8};
use thiserror::Error;

/// Supported upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Spreadsheet,
}

impl FileFormat {
    /// Pick the format from the file extension (case-insensitive)
    pub fn from_filename(filename: &str) -> Result<Self, ParseError> {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" => Ok(FileFormat::Csv),
            "xlsx" | "xls" => Ok(FileFormat::Spreadsheet),
            _ => Err(ParseError::UnsupportedFormat(filename.to_string())),
        }
    }
}

/// One data row: normalized column name -> trimmed cell text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRecord {
    /// Position in the file as a user sees it (first data row is 2)
    pub number: usize,
    cells: Vec<(String, String)>,
}

impl RowRecord {
    pub fn new(number: usize, cells: Vec<(String, String)>) -> Self {
        Self { number, cells }
    }

    /// Raw value of a column ("" when the column is absent)
    pub fn get(&self, column: &str) -> &str {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
            .unwrap_or("")
    }
}

/// A parsed upload
#[derive(Debug, Clone)]
pub struct ParsedTable {
    pub headers: Vec<String>,
    pub rows: Vec<RowRecord>,
}

impl ParsedTable {
    /// Required columns that are absent from the header row, in the given order
    pub fn missing_columns(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|col| !self.headers.iter().any(|h| h == *col))
            .map(|col| col.to_string())
            .collect()
    }
}

/// Errors that make a whole file unusable
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unsupported file format: '{0}' (expected .csv, .xlsx or .xls)")]
    UnsupportedFormat(String),

    #[error("could not decode file: {0}")]
    Decode(String),

    #[error("could not read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("could not open workbook: {0}")]
    Workbook(String),

    #[error("file has no header row")]
    MissingHeader,

    #[error("duplicate column '{0}' in header row")]
    DuplicateColumn(String),

    #[error("file contains no data rows")]
    Empty,
}

/// Parse uploaded bytes into a table
pub fn parse(bytes: &[u8], filename: &str) -> Result<ParsedTable, ParseError> {
    let (headers, rows) = match FileFormat::from_filename(filename)? {
        FileFormat::Csv => read_csv(bytes)?,
        FileFormat::Spreadsheet => read_spreadsheet(bytes)?,
    };
    build_table(headers, rows)
}

/// Decode CSV bytes: honour UTF-8/UTF-16 byte order marks, otherwise require UTF-8
fn decode_text(bytes: &[u8]) -> Result<Cow<'_, str>, ParseError> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        if had_errors {
            return Err(ParseError::Decode(format!(
                "malformed {} content",
                encoding.name()
            )));
        }
        return Ok(text);
    }

    UTF_8
        .decode_without_bom_handling_and_without_replacement(bytes)
        .ok_or_else(|| ParseError::Decode("file is not valid UTF-8".to_string()))
}

type RawRows = (Vec<String>, Vec<Vec<String>>);

fn read_csv(bytes: &[u8]) -> Result<RawRows, ParseError> {
    let text = decode_text(bytes)?;

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = rdr.headers()?.iter().map(String::from).collect();

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(record.iter().map(String::from).collect());
    }

    Ok((headers, rows))
}

fn read_spreadsheet(bytes: &[u8]) -> Result<RawRows, ParseError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| ParseError::Workbook(e.to_string()))?;

    let first = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ParseError::Workbook("workbook has no sheets".to_string()))?;

    let range = workbook
        .worksheet_range(&first)
        .map_err(|e| ParseError::Workbook(e.to_string()))?;

    let mut iter = range.rows();
    let headers = match iter.next() {
        Some(row) => row.iter().map(cell_text).collect(),
        None => return Err(ParseError::MissingHeader),
    };
    let rows = iter.map(|row| row.iter().map(cell_text).collect()).collect();

    Ok((headers, rows))
}

/// Render a spreadsheet cell as text; whole numbers lose the ".0"
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(_) => String::new(),
        Data::Empty => String::new(),
    }
}

/// Normalize headers, drop blank rows and number what remains
fn build_table(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<ParsedTable, ParseError> {
    let headers: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(ParseError::MissingHeader);
    }

    let mut seen = HashSet::new();
    for header in headers.iter().filter(|h| !h.is_empty()) {
        if !seen.insert(header.as_str()) {
            return Err(ParseError::DuplicateColumn(header.clone()));
        }
    }

    let records: Vec<RowRecord> = rows
        .into_iter()
        .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
        .enumerate()
        .map(|(idx, row)| {
            let cells = headers
                .iter()
                .enumerate()
                .filter(|(_, name)| !name.is_empty())
                .map(|(col, name)| {
                    let value = row.get(col).map(|v| v.trim()).unwrap_or("");
                    (name.clone(), value.to_string())
                })
                .collect();
            RowRecord::new(idx + 2, cells)
        })
        .collect();

    if records.is_empty() {
        return Err(ParseError::Empty);
    }

    Ok(ParsedTable {
        headers: headers.into_iter().filter(|h| !h.is_empty()).collect(),
        rows: records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(FileFormat::from_filename("a.CSV").unwrap(), FileFormat::Csv);
        assert_eq!(FileFormat::from_filename("b.xlsx").unwrap(), FileFormat::Spreadsheet);
        assert_eq!(FileFormat::from_filename("c.Xls").unwrap(), FileFormat::Spreadsheet);
        assert!(matches!(
            FileFormat::from_filename("d.txt"),
            Err(ParseError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            FileFormat::from_filename("noext"),
            Err(ParseError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_csv_headers_normalized_and_rows_numbered() {
        let csv = " Subject_Code ,SUBJECT_NAME,credits\nIT101, Intro ,3\nIT102,Data,4\n";
        let table = parse(csv.as_bytes(), "subjects.csv").unwrap();

        assert_eq!(table.headers, vec!["subject_code", "subject_name", "credits"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].number, 2);
        assert_eq!(table.rows[0].get("subject_name"), "Intro");
        assert_eq!(table.rows[1].number, 3);
        assert_eq!(table.rows[1].get("subject_code"), "IT102");
        assert_eq!(table.rows[1].get("not_a_column"), "");
    }

    #[test]
    fn test_values_stay_text() {
        let csv = "phone,code\n0901234567,007\n";
        let table = parse(csv.as_bytes(), "x.csv").unwrap();
        assert_eq!(table.rows[0].get("phone"), "0901234567");
        assert_eq!(table.rows[0].get("code"), "007");
    }

    #[test]
    fn test_utf8_bom_is_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("email,full_name\na@x.edu,Ánh\n".as_bytes());

        let table = parse(&bytes, "users.csv").unwrap();
        assert_eq!(table.headers[0], "email");
        assert_eq!(table.rows[0].get("full_name"), "Ánh");
    }

    #[test]
    fn test_utf16le_with_bom() {
        let text = "email,full_name\nb@x.edu,Bình\n";
        let mut bytes = vec![0xFF, 0xFE];
        for unit in text.encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }

        let table = parse(&bytes, "users.csv").unwrap();
        assert_eq!(table.rows[0].get("email"), "b@x.edu");
        assert_eq!(table.rows[0].get("full_name"), "Bình");
    }

    #[test]
    fn test_invalid_utf8_without_bom_fails() {
        let bytes = b"email\n\xff\xfe\xfd\n";
        assert!(matches!(parse(bytes, "u.csv"), Err(ParseError::Decode(_))));
    }

    #[test]
    fn test_empty_and_header_only_files() {
        assert!(matches!(parse(b"", "e.csv"), Err(ParseError::MissingHeader)));
        assert!(matches!(
            parse(b"email,full_name\n", "e.csv"),
            Err(ParseError::Empty)
        ));
        assert!(matches!(
            parse(b"email,full_name\n,\n , \n", "e.csv"),
            Err(ParseError::Empty)
        ));
    }

    #[test]
    fn test_duplicate_header_rejected() {
        let err = parse(b"email,Email\na@x,b@x\n", "d.csv").unwrap_err();
        assert!(matches!(err, ParseError::DuplicateColumn(ref c) if c == "email"));
    }

    #[test]
    fn test_blank_rows_dropped_before_numbering() {
        let csv = "code\nA\n,\nB\n";
        let table = parse(csv.as_bytes(), "c.csv").unwrap();
        let numbered: Vec<_> = table
            .rows
            .iter()
            .map(|r| (r.number, r.get("code").to_string()))
            .collect();
        assert_eq!(numbered, vec![(2, "A".to_string()), (3, "B".to_string())]);
    }

    #[test]
    fn test_short_rows_pad_with_blank() {
        let table = parse(b"a,b,c\n1\n", "s.csv").unwrap();
        assert_eq!(table.rows[0].get("a"), "1");
        assert_eq!(table.rows[0].get("c"), "");
    }

    #[test]
    fn test_missing_columns_in_required_order() {
        let table = parse(b"credits,subject_code\n3,IT1\n", "s.csv").unwrap();
        let missing = table.missing_columns(&["subject_code", "subject_name", "credits", "dept_name"]);
        assert_eq!(missing, vec!["subject_name", "dept_name"]);
    }

    #[test]
    fn test_garbage_workbook_fails() {
        let err = parse(b"definitely not a zip", "book.xlsx").unwrap_err();
        assert!(matches!(err, ParseError::Workbook(_)));
    }

    #[test]
    fn test_spreadsheet_cells_render_as_text() {
        assert_eq!(cell_text(&Data::Float(84901234567.0)), "84901234567");
        assert_eq!(cell_text(&Data::Float(3.5)), "3.5");
        assert_eq!(cell_text(&Data::Int(7)), "7");
        assert_eq!(cell_text(&Data::String("  IT101 ".to_string())), "IT101");
        assert_eq!(cell_text(&Data::Empty), "");
    }

    #[test]
    fn test_workbook_reads_first_sheet_as_text() {
        let mut workbook = Workbook::new();
        let subjects = workbook.add_worksheet();
        subjects.set_name("Subjects").unwrap();
        subjects.write_string(0, 0, " Subject_Code ").unwrap();
        subjects.write_string(0, 1, "SUBJECT_NAME").unwrap();
        subjects.write_string(0, 2, "Credits").unwrap();
        subjects.write_string(0, 3, "dept_name").unwrap();
        subjects.write_string(1, 0, "IT101").unwrap();
        subjects.write_string(1, 1, " Intro to IT ").unwrap();
        subjects.write_number(1, 2, 3.0).unwrap();
        subjects.write_string(1, 3, "Computer Science").unwrap();
        // row 3 left blank
        subjects.write_number(3, 0, 7.0).unwrap();
        subjects.write_string(3, 1, "Seven").unwrap();
        subjects.write_number(3, 2, 4.0).unwrap();
        subjects.write_string(3, 3, "Mathematics").unwrap();

        let notes = workbook.add_worksheet();
        notes.set_name("Notes").unwrap();
        notes.write_string(0, 0, "email").unwrap();
        notes.write_string(1, 0, "ignored@uni.edu").unwrap();

        let bytes = workbook.save_to_buffer().unwrap();
        let table = parse(&bytes, "Subjects.XLSX").unwrap();

        assert_eq!(table.headers, vec!["subject_code", "subject_name", "credits", "dept_name"]);
        assert_eq!(table.rows.len(), 2);

        assert_eq!(table.rows[0].number, 2);
        assert_eq!(table.rows[0].get("subject_name"), "Intro to IT");
        assert_eq!(table.rows[0].get("credits"), "3");

        assert_eq!(table.rows[1].number, 3);
        assert_eq!(table.rows[1].get("subject_code"), "7");
        assert_eq!(table.rows[1].get("credits"), "4");
        assert_eq!(table.rows[1].get("email"), "");
    }

    #[test]
    fn test_workbook_header_need_not_start_at_a1() {
        let mut workbook = Workbook::new();
        let users = workbook.add_worksheet();
        users.write_string(2, 1, "Email").unwrap();
        users.write_string(2, 2, "Phone").unwrap();
        users.write_string(3, 1, "a@uni.edu").unwrap();
        users.write_number(3, 2, 912345678.0).unwrap();

        let bytes = workbook.save_to_buffer().unwrap();
        let table = parse(&bytes, "users.xlsx").unwrap();

        assert_eq!(table.headers, vec!["email", "phone"]);
        assert_eq!(table.rows[0].get("email"), "a@uni.edu");
        assert_eq!(table.rows[0].get("phone"), "912345678");
    }

    #[test]
    fn test_build_table_ignores_unnamed_columns() {
        let table = build_table(
            vec!["code".into(), "".into()],
            vec![vec!["A".into(), "junk".into()]],
        )
        .unwrap();
        assert_eq!(table.headers, vec!["code"]);
        assert_eq!(
            table.rows[0],
            RowRecord::new(2, vec![("code".to_string(), "A".to_string())])
        );
    }
}
