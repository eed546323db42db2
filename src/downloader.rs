#![cfg(not(tarpaulin_include))]

use crate::error::Result;
use crate::record::{FIELDS, Student};

/// Column headers of an export, id first
pub fn export_headers() -> Vec<&'static str> {
    std::iter::once("id").chain(FIELDS).collect()
}

fn student_row(student: &Student) -> Vec<&str> {
    export_headers()
        .into_iter()
        .map(|name| student.value_of(name).unwrap_or_default())
        .collect()
}

/// Convert the roster to CSV format
///
/// The first line holds the field names; values that contain commas,
/// quotes or newlines are quoted.
///
/// # Arguments
/// * `students` - Students to export, in the order they should appear
///
/// # Returns
/// * `Result<String>` - CSV content as a string or an error
///
/// # Examples
/// ```
/// use student_records::downloader::to_csv;
/// use student_records::record::Student;
///
/// let student = Student { id: "1".into(), name: "Ana".into(), ..Default::default() };
/// let csv = to_csv(&[student]).unwrap();
/// assert!(csv.starts_with("id,name,age"));
/// ```
pub fn to_csv(students: &[Student]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(export_headers())?;
    for student in students {
        writer.write_record(student_row(student))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Convert the roster to XLSX format
///
/// Writes a single worksheet with a bold header row using rust_xlsxwriter.
/// Ages that are whole numbers are written as numbers, everything else as text.
///
/// # Arguments
/// * `students` - Students to export
///
/// # Returns
/// * `Result<Vec<u8>>` - XLSX file content as bytes or an error
#[cfg(feature = "web")]
pub fn to_xlsx(students: &[Student]) -> Result<Vec<u8>> {
    use rust_xlsxwriter::{Format, Workbook};

    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Students")?;

    let headers = export_headers();
    for (c, header) in headers.iter().enumerate() {
        worksheet.write_string_with_format(0, c as u16, *header, &bold)?;
    }

    for (r, student) in students.iter().enumerate() {
        let row = (r + 1) as u32;
        for (c, value) in student_row(student).into_iter().enumerate() {
            let col = c as u16;
            match (headers[c], value.parse::<i64>()) {
                ("age", Ok(age)) => {
                    worksheet.write_number(row, col, age as f64)?;
                }
                _ => {
                    worksheet.write_string(row, col, value)?;
                }
            }
        }
    }

    let buffer = workbook.save_to_buffer()?;

    Ok(buffer)
}
