use crate::record::Student;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Attribute a search is run against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchAttribute {
    Id,
    #[default]
    Name,
    Age,
    Gender,
    Course,
    Birthdate,
    Phone,
    Email,
    Address,
}

impl SearchAttribute {
    /// Every searchable attribute, in the order the UI lists them
    pub const ALL: [SearchAttribute; 9] = [
        SearchAttribute::Id,
        SearchAttribute::Name,
        SearchAttribute::Age,
        SearchAttribute::Gender,
        SearchAttribute::Course,
        SearchAttribute::Birthdate,
        SearchAttribute::Phone,
        SearchAttribute::Email,
        SearchAttribute::Address,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchAttribute::Id => "id",
            SearchAttribute::Name => "name",
            SearchAttribute::Age => "age",
            SearchAttribute::Gender => "gender",
            SearchAttribute::Course => "course",
            SearchAttribute::Birthdate => "birthdate",
            SearchAttribute::Phone => "phone",
            SearchAttribute::Email => "email",
            SearchAttribute::Address => "address",
        }
    }
}

impl fmt::Display for SearchAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchAttribute {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        SearchAttribute::ALL
            .into_iter()
            .find(|attr| attr.as_str() == wanted)
            .ok_or_else(|| format!("Unknown search attribute: {}", s))
    }
}

/// Filter students by a case-insensitive substring match
///
/// # Arguments
/// * `students` - The full list of students
/// * `attribute` - Which field to search
/// * `query` - Text to look for; an empty query keeps every student
///
/// # Returns
/// * `Vec<Student>` - The matching students, in their original order
pub fn filter_students(
    students: &[Student],
    attribute: SearchAttribute,
    query: &str,
) -> Vec<Student> {
    let needle = query.to_lowercase();

    students
        .iter()
        .filter(|student| {
            student
                .value_of(attribute.as_str())
                .map(|value| value.to_lowercase().contains(&needle))
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

/// Compare two ids: numerically when both are integers, else as text
pub fn compare_ids(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<i64>(), b.trim().parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Sort students by id in place
pub fn sort_by_id(students: &mut [Student]) {
    students.sort_by(|a, b| compare_ids(&a.id, &b.id));
}
