//! Aggregate figures for the dashboard view.
//!
//! Everything here is derived from the full list of students on each
//! request; nothing is cached or stored.

use serde::{Deserialize, Serialize};

use crate::loader::parse_age;
use crate::record::Student;

/// One bar, slice or point of a chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartEntry {
    pub name: String,
    pub value: usize,
}

/// Headline numbers shown above the charts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_students: usize,
    /// Mean age with one decimal, e.g. `"20.5"`
    pub average_age: String,
    pub courses_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub course_data: Vec<ChartEntry>,
    pub gender_data: Vec<ChartEntry>,
    pub age_data: Vec<ChartEntry>,
    pub stats: DashboardStats,
}

/// Compute the dashboard for a list of students
///
/// # Arguments
/// * `students` - Every student currently stored
///
/// # Returns
/// * `Option<DashboardData>` - `None` when there are no students
pub fn build_dashboard(students: &[Student]) -> Option<DashboardData> {
    if students.is_empty() {
        return None;
    }

    let course_data = count_in_order(students.iter().map(|s| s.course.as_str()));
    let gender_data = count_in_order(students.iter().map(|s| s.gender.as_str()));

    let ages: Vec<i64> = students.iter().filter_map(|s| parse_age(&s.age)).collect();
    let age_data = age_distribution(&ages);

    let average_age = if ages.is_empty() {
        0.0
    } else {
        ages.iter().map(|&age| i128::from(age)).sum::<i128>() as f64 / ages.len() as f64
    };

    Some(DashboardData {
        stats: DashboardStats {
            total_students: students.len(),
            average_age: format!("{:.1}", average_age),
            courses_count: course_data.len(),
        },
        course_data,
        gender_data,
        age_data,
    })
}

/// Lower bound of the five-year bucket an age falls in
///
/// Widened to `i128` so buckets at the edges of `i64` still have a bound.
pub fn age_bucket_start(age: i64) -> i128 {
    i128::from(age).div_euclid(5) * 5
}

/// Label of the five-year bucket an age falls in, e.g. `"20-24"`
pub fn age_bucket_label(age: i64) -> String {
    bucket_label(age_bucket_start(age))
}

fn bucket_label(start: i128) -> String {
    format!("{}-{}", start, start + 4)
}

// Counts keep the order in which each value was first seen.
fn count_in_order<'a>(values: impl Iterator<Item = &'a str>) -> Vec<ChartEntry> {
    let mut entries: Vec<ChartEntry> = Vec::new();

    for value in values {
        match entries.iter_mut().find(|e| e.name == value) {
            Some(entry) => entry.value += 1,
            None => entries.push(ChartEntry {
                name: value.to_string(),
                value: 1,
            }),
        }
    }

    entries
}

fn age_distribution(ages: &[i64]) -> Vec<ChartEntry> {
    let mut buckets: Vec<(i128, usize)> = Vec::new();

    for &age in ages {
        let start = age_bucket_start(age);
        match buckets.iter_mut().find(|(s, _)| *s == start) {
            Some((_, count)) => *count += 1,
            None => buckets.push((start, 1)),
        }
    }

    buckets.sort_by_key(|(start, _)| *start);
    buckets
        .into_iter()
        .map(|(start, count)| ChartEntry {
            name: bucket_label(start),
            value: count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(id: &str, age: &str, gender: &str, course: &str) -> Student {
        Student {
            id: id.to_string(),
            age: age.to_string(),
            gender: gender.to_string(),
            course: course.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn no_students_means_no_dashboard() {
        assert_eq!(build_dashboard(&[]), None);
    }

    #[test]
    fn counts_courses_and_genders_in_first_seen_order() {
        let students = vec![
            student("1", "19", "F", "Physics"),
            student("2", "22", "M", "Math"),
            student("3", "21", "F", "Physics"),
        ];
        let data = build_dashboard(&students).unwrap();

        assert_eq!(
            data.course_data,
            vec![
                ChartEntry { name: "Physics".into(), value: 2 },
                ChartEntry { name: "Math".into(), value: 1 },
            ]
        );
        assert_eq!(data.gender_data[0], ChartEntry { name: "F".into(), value: 2 });
        assert_eq!(data.stats.total_students, 3);
        assert_eq!(data.stats.courses_count, 2);
    }

    #[test]
    fn ages_bucket_by_five_and_sort() {
        let students = vec![
            student("1", "31", "F", "A"),
            student("2", "19", "M", "A"),
            student("3", "24", "F", "A"),
            student("4", "20", "F", "A"),
        ];
        let data = build_dashboard(&students).unwrap();

        let labels: Vec<&str> = data.age_data.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(labels, vec!["15-19", "20-24", "30-34"]);
        assert_eq!(data.age_data[1].value, 2);
        assert_eq!(data.stats.average_age, "23.5");
    }

    #[test]
    fn unparseable_ages_are_left_out() {
        let students = vec![
            student("1", "twenty", "F", "A"),
            student("2", "", "M", "A"),
        ];
        let data = build_dashboard(&students).unwrap();

        assert!(data.age_data.is_empty());
        assert_eq!(data.stats.average_age, "0.0");
        assert_eq!(data.stats.total_students, 2);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let data = build_dashboard(&[student("1", "20", "F", "A")]).unwrap();
        let json = serde_json::to_value(&data).unwrap();

        assert_eq!(json["stats"]["totalStudents"], 1);
        assert_eq!(json["stats"]["averageAge"], "20.0");
        assert_eq!(json["courseData"][0]["name"], "A");
    }

    #[test]
    fn extreme_ages_do_not_overflow() {
        let data = build_dashboard(&[student("1", &i64::MAX.to_string(), "F", "A")]).unwrap();
        assert_eq!(
            data.age_data[0].name,
            "9223372036854775805-9223372036854775809"
        );
        assert!(!data.stats.average_age.starts_with('-'));

        let data = build_dashboard(&[
            student("1", "5000000000000000000", "F", "A"),
            student("2", "5000000000000000000", "M", "A"),
        ])
        .unwrap();
        assert_eq!(data.stats.average_age, "5000000000000000000.0");
        assert_eq!(
            data.age_data,
            vec![ChartEntry {
                name: "5000000000000000000-5000000000000000004".into(),
                value: 2,
            }]
        );

        assert_eq!(age_bucket_start(i64::MIN), -9223372036854775810);
        assert_eq!(age_bucket_label(-3), "-5--1");
    }
}
