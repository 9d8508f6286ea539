use crate::corpus::RawRecord;
use crate::error::Result;
use crate::selection::SelectionReport;
use csv::ReaderBuilder;
use std::fs::{create_dir_all, File};
use std::io::{Read, Write};
use std::path::Path;

const TEXT_COLUMN: &str = "text";
const CLASS_COLUMN: &str = "class";

/// Read raw `{text, class}` rows from a CSV file with a header row.
///
/// Columns are found by header name; when the header names neither, the first
/// two columns are used.
pub fn load_records_csv<P: AsRef<Path>>(path: P) -> Result<Vec<RawRecord>> {
    let f = File::open(path.as_ref())?;
    read_records_csv(f)
}

pub fn read_records_csv<R: Read>(reader: R) -> Result<Vec<RawRecord>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let position = |name: &str| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name));
    let (text_col, class_col) = match (position(TEXT_COLUMN), position(CLASS_COLUMN)) {
        (None, None) => (0, 1),
        (Some(t), None) => (t, usize::MAX),
        (None, Some(c)) => (usize::MAX, c),
        (Some(t), Some(c)) => (t, c),
    };

    let mut rows = Vec::new();
    for (i, row) in rdr.records().enumerate() {
        let row = row?;
        // header is line 1
        let line = row.position().map_or(i + 2, |p| p.line() as usize);
        rows.push(RawRecord {
            line,
            text: row.get(text_col).map(str::to_string),
            class: row.get(class_col).map(str::to_string),
        });
    }
    tracing::debug!(rows = rows.len(), "csv records read");
    Ok(rows)
}

pub fn save_report<P: AsRef<Path>>(path: P, report: &SelectionReport) -> Result<()> {
    if let Some(dir) = path.as_ref().parent().filter(|d| !d.as_os_str().is_empty()) {
        create_dir_all(dir)?;
    }
    let mut f = File::create(path.as_ref())?;
    let json = serde_json::to_string_pretty(report)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_report<P: AsRef<Path>>(path: P) -> Result<SelectionReport> {
    let mut f = File::open(path.as_ref())?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let report: SelectionReport = serde_json::from_str(&buf)?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_named_columns_in_any_order() {
        let data = "id,class,text\n1,0,Free entry\n2,1,\"thanks, friend\"\n";
        let rows = read_records_csv(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text.as_deref(), Some("Free entry"));
        assert_eq!(rows[0].class.as_deref(), Some("0"));
        assert_eq!(rows[1].text.as_deref(), Some("thanks, friend"));
        assert_eq!(rows[1].line, 3);
    }

    #[test]
    fn short_rows_miss_the_class() {
        let data = "text,class\nhello,1\nlonely\n";
        let rows = read_records_csv(data.as_bytes()).unwrap();
        assert_eq!(rows[1].text.as_deref(), Some("lonely"));
        assert_eq!(rows[1].class, None);
    }

    #[test]
    fn unnamed_header_falls_back_to_first_columns() {
        let rows = read_records_csv("tweet,label\nwin big,0\n".as_bytes()).unwrap();
        assert_eq!(rows[0].text.as_deref(), Some("win big"));
        assert_eq!(rows[0].class.as_deref(), Some("0"));
    }
}
