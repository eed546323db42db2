use chrono::{DateTime, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::record::StudentPayload;

lazy_static! {
    static ref LEADING_INT: Regex = Regex::new(r"^[+-]?[0-9]+").unwrap();
}

/// Number of rows shown in an import preview
pub const PREVIEW_ROWS: usize = 5;

/// Date layouts accepted for a birthdate, tried in order
const DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%B %d, %Y",
    "%b %d, %Y",
];

/// One parsed data row of an import file
///
/// Cells are trimmed; an empty cell is `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportRow {
    pub id: Option<String>,
    pub name: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub course: Option<String>,
    pub birthdate: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl ImportRow {
    /// Turn the row into the body of a create request
    pub fn to_payload(&self) -> StudentPayload {
        let text = |v: &Option<String>| v.clone().map(Value::String);

        StudentPayload {
            id: text(&self.id),
            name: text(&self.name),
            age: self.age.map(Value::from),
            gender: text(&self.gender),
            course: text(&self.course),
            birthdate: text(&self.birthdate),
            phone: text(&self.phone),
            email: text(&self.email),
            address: text(&self.address),
        }
    }
}

/// A row that would be rejected on upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncompleteRow {
    /// 1-based data row number (the header is not counted)
    pub row: usize,
    pub missing: Vec<String>,
}

/// What the user sees before committing an import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportPreview {
    pub total: usize,
    pub rows: Vec<ImportRow>,
    pub incomplete: Vec<IncompleteRow>,
}

/// Outcome of an import upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub message: String,
    pub created: usize,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_row: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Check that an uploaded file name looks like a CSV file
pub fn is_csv_filename(name: &str) -> bool {
    name.to_lowercase().ends_with(".csv")
}

/// Parse student rows out of CSV data
///
/// The first line is the header. Columns are matched to student fields by
/// name, ignoring case and surrounding spaces; unknown columns are ignored.
/// Rows where every cell is blank are dropped.
///
/// # Arguments
/// * `data` - Raw bytes of the uploaded file
///
/// # Returns
/// * `Result<Vec<ImportRow>>` - The parsed rows or a CSV error
///
/// # Examples
/// ```
/// use student_records::loader::read_students_csv;
///
/// let csv = "id,name,age\n1,Ana,21\n";
/// let rows = read_students_csv(csv.as_bytes()).unwrap();
/// assert_eq!(rows[0].age, Some(21));
/// ```
pub fn read_students_csv(data: &[u8]) -> Result<Vec<ImportRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_lowercase())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let mut row = ImportRow::default();
        for (header, cell) in headers.iter().zip(record.iter()) {
            let cell = cell.trim();
            let text = if cell.is_empty() {
                None
            } else {
                Some(cell.to_string())
            };

            match header.as_str() {
                "id" => row.id = text,
                "name" => row.name = text,
                "age" => row.age = parse_age(cell),
                "gender" => row.gender = text,
                "course" => row.course = text,
                "birthdate" => row.birthdate = text.map(|t| normalize_birthdate(&t)),
                "phone" => row.phone = text,
                "email" => row.email = text,
                "address" => row.address = text,
                _ => {}
            }
        }
        rows.push(row);
    }

    Ok(rows)
}

/// Parse CSV data for an uploaded file, checking its name first
pub fn read_uploaded_csv(filename: &str, data: &[u8]) -> Result<Vec<ImportRow>> {
    if !is_csv_filename(filename) {
        return Err(Error::InvalidFormat(filename.to_string()));
    }
    read_students_csv(data)
}

/// Build the preview shown before an upload
pub fn preview(rows: &[ImportRow]) -> ImportPreview {
    let incomplete = rows
        .iter()
        .enumerate()
        .filter_map(|(i, row)| {
            let missing = row.to_payload().missing_fields();
            if missing.is_empty() {
                None
            } else {
                Some(IncompleteRow {
                    row: i + 1,
                    missing: missing.into_iter().map(String::from).collect(),
                })
            }
        })
        .collect();

    ImportPreview {
        total: rows.len(),
        rows: rows.iter().take(PREVIEW_ROWS).cloned().collect(),
        incomplete,
    }
}

/// Read the leading integer of an age cell (`"21 years"` gives 21)
pub fn parse_age(cell: &str) -> Option<i64> {
    LEADING_INT
        .find(cell.trim())
        .and_then(|m| m.as_str().parse().ok())
}

/// Rewrite a recognised date as `YYYY-MM-DD`; anything else is returned as is
pub fn normalize_birthdate(value: &str) -> String {
    let value = value.trim();

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return date.format("%Y-%m-%d").to_string();
        }
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return timestamp.date_naive().format("%Y-%m-%d").to_string();
    }

    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_rows_by_header_name() {
        let csv = "Name , ID,age,gender,course,birthdate,phone,email,address,notes\n\
                   Ana,1, 21 ,F,Math,01/15/2003,5551234567,ana@example.com,\"1 Main St, Apt 2\",x\n";
        let rows = read_students_csv(csv.as_bytes()).unwrap();

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.id.as_deref(), Some("1"));
        assert_eq!(row.name.as_deref(), Some("Ana"));
        assert_eq!(row.age, Some(21));
        assert_eq!(row.birthdate.as_deref(), Some("2003-01-15"));
        assert_eq!(row.address.as_deref(), Some("1 Main St, Apt 2"));
    }

    #[test]
    fn blank_rows_are_skipped_and_short_rows_tolerated() {
        let csv = "id,name,age\n1,Ana,21\n , ,\n2,Ben\n";
        let rows = read_students_csv(csv.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].name.as_deref(), Some("Ben"));
        assert_eq!(rows[1].age, None);
    }

    #[test]
    fn age_takes_leading_integer() {
        assert_eq!(parse_age("21 years"), Some(21));
        assert_eq!(parse_age(" 19"), Some(19));
        assert_eq!(parse_age("twenty"), None);
        assert_eq!(parse_age(""), None);
    }

    #[test]
    fn birthdates_are_normalised_when_recognised() {
        assert_eq!(normalize_birthdate("2001-09-30"), "2001-09-30");
        assert_eq!(normalize_birthdate("2001/09/03"), "2001-09-03");
        assert_eq!(normalize_birthdate("March 04, 1999"), "1999-03-04");
        assert_eq!(normalize_birthdate("2000-05-06T10:00:00Z"), "2000-05-06");
        assert_eq!(normalize_birthdate("sometime in May"), "sometime in May");
    }

    #[test]
    fn preview_keeps_five_rows_and_flags_incomplete_ones() {
        let mut csv = String::from("id,name,age,gender,course,birthdate,phone,email,address\n");
        for i in 1..=7 {
            csv.push_str(&format!(
                "{i},Student {i},20,F,Math,2004-01-01,555000000{i},s{i}@example.com,Street {i}\n"
            ));
        }
        csv.push_str("8,,20,F,Math,2004-01-01,5550000008,s8@example.com,Street 8\n");

        let rows = read_students_csv(csv.as_bytes()).unwrap();
        let preview = preview(&rows);

        assert_eq!(preview.total, 8);
        assert_eq!(preview.rows.len(), PREVIEW_ROWS);
        assert_eq!(
            preview.incomplete,
            vec![IncompleteRow {
                row: 8,
                missing: vec!["name".to_string()],
            }]
        );
    }

    #[test]
    fn uploaded_file_must_be_csv() {
        assert!(is_csv_filename("Students.CSV"));
        let err = read_uploaded_csv("students.xlsx", b"id\n1\n").unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));
    }
}
