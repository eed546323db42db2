use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Field names of a student record, excluding the id, in display order.
pub const FIELDS: [&str; 8] = [
    "name",
    "age",
    "gender",
    "course",
    "birthdate",
    "phone",
    "email",
    "address",
];

/// A single student record
///
/// Every field is stored as text; the key-value store does not enforce a
/// schema, so a record read back from it may have empty fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Unique identifier, also the suffix of the store key
    pub id: String,
    pub name: String,
    pub age: String,
    pub gender: String,
    pub course: String,
    pub birthdate: String,
    pub phone: String,
    pub email: String,
    pub address: String,
}

impl Student {
    /// Build a record from a stored hash
    ///
    /// # Arguments
    /// * `id` - The student id taken from the store key
    /// * `hash` - Field/value pairs as read from the store
    ///
    /// # Returns
    /// * `Student` - The record; fields missing from the hash are left empty
    pub fn from_hash(id: &str, hash: &HashMap<String, String>) -> Self {
        let field = |name: &str| hash.get(name).cloned().unwrap_or_default();

        Student {
            id: id.to_string(),
            name: field("name"),
            age: field("age"),
            gender: field("gender"),
            course: field("course"),
            birthdate: field("birthdate"),
            phone: field("phone"),
            email: field("email"),
            address: field("address"),
        }
    }

    /// Look up a field by attribute name (`id` included)
    pub fn value_of(&self, attribute: &str) -> Option<&str> {
        let value = match attribute {
            "id" => &self.id,
            "name" => &self.name,
            "age" => &self.age,
            "gender" => &self.gender,
            "course" => &self.course,
            "birthdate" => &self.birthdate,
            "phone" => &self.phone,
            "email" => &self.email,
            "address" => &self.address,
            _ => return None,
        };
        Some(value.as_str())
    }
}

/// Body of a create or update request
///
/// Fields are taken as raw JSON so that the browser form (strings) and the
/// CSV import (numeric ages, nulls) both fit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudentPayload {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub age: Option<Value>,
    #[serde(default)]
    pub gender: Option<Value>,
    #[serde(default)]
    pub course: Option<Value>,
    #[serde(default)]
    pub birthdate: Option<Value>,
    #[serde(default)]
    pub phone: Option<Value>,
    #[serde(default)]
    pub email: Option<Value>,
    #[serde(default)]
    pub address: Option<Value>,
}

impl StudentPayload {
    fn raw(&self, field: &str) -> Option<&Value> {
        match field {
            "id" => self.id.as_ref(),
            "name" => self.name.as_ref(),
            "age" => self.age.as_ref(),
            "gender" => self.gender.as_ref(),
            "course" => self.course.as_ref(),
            "birthdate" => self.birthdate.as_ref(),
            "phone" => self.phone.as_ref(),
            "email" => self.email.as_ref(),
            "address" => self.address.as_ref(),
            _ => None,
        }
    }

    /// The id as stored text, if present
    pub fn id_text(&self) -> Option<String> {
        self.id.as_ref().and_then(field_text)
    }

    /// Present non-id fields, in `FIELDS` order
    ///
    /// # Returns
    /// * `Vec<(&'static str, String)>` - Field name and stored text for every present field
    pub fn present_fields(&self) -> Vec<(&'static str, String)> {
        FIELDS
            .iter()
            .filter_map(|&name| {
                self.raw(name)
                    .and_then(field_text)
                    .map(|text| (name, text))
            })
            .collect()
    }

    /// Names of absent fields, the id included
    ///
    /// A create request is only accepted when this is empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        std::iter::once("id")
            .chain(FIELDS)
            .filter(|&name| self.raw(name).and_then(field_text).is_none())
            .collect()
    }
}

/// Coerce a JSON value to the text stored for it
///
/// `null`, `false`, `""` and `0` count as absent, the same values a browser
/// form treats as empty.
///
/// # Arguments
/// * `value` - The raw JSON value from a request body
///
/// # Returns
/// * `Option<String>` - The stored text, or `None` when the value is absent
pub fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => {
            let zero = n.as_f64().map(|f| f == 0.0).unwrap_or(false);
            if zero { None } else { Some(n.to_string()) }
        }
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}
