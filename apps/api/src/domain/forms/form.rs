use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::errors::{require_text, DomainError, DomainResult};

/// Custom registration questions attached to a league
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DynamicForm {
    pub id: Uuid,
    pub league_id: Uuid,
    pub title: String,
    pub description: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl DynamicForm {
    pub fn new(league_id: Uuid, title: &str, description: &str) -> DomainResult<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            league_id,
            title: require_text(title, "Form title")?,
            description: description.trim().to_string(),
            is_active: true,
            created_at: Utc::now(),
        })
    }
}

/// Input kind of a form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "form_field_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Textarea,
    Number,
    Email,
    Date,
    Select,
    Checkbox,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::Text => "text",
            FieldType::Textarea => "textarea",
            FieldType::Number => "number",
            FieldType::Email => "email",
            FieldType::Date => "date",
            FieldType::Select => "select",
            FieldType::Checkbox => "checkbox",
        };
        f.write_str(name)
    }
}

/// One question on a form
///
/// Answers are keyed by the field id.
#[derive(Debug, Clone, Serialize)]
pub struct FormField {
    pub id: Uuid,
    pub form_id: Uuid,
    pub label: String,
    pub field_type: FieldType,
    pub required: bool,
    pub choices: Vec<String>,
    pub position: i32,
}

impl FormField {
    pub fn new(
        form_id: Uuid,
        label: &str,
        field_type: FieldType,
        required: bool,
        choices: Vec<String>,
        position: i32,
    ) -> DomainResult<Self> {
        let label = require_text(label, "Field label")?;
        let choices: Vec<String> = choices
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();

        match field_type {
            FieldType::Select if choices.is_empty() => {
                return Err(DomainError::validation(format!(
                    "Select field '{}' needs at least one choice",
                    label
                )))
            }
            FieldType::Select => {}
            _ if !choices.is_empty() => {
                return Err(DomainError::validation(format!(
                    "Only select fields take choices ('{}' is {})",
                    label, field_type
                )))
            }
            _ => {}
        }

        Ok(Self {
            id: Uuid::new_v4(),
            form_id,
            label,
            field_type,
            required,
            choices,
            position,
        })
    }

    /// Checks a single answer; `None` means the key was absent
    fn check(&self, answer: Option<&Value>) -> Result<(), String> {
        let answer = match answer {
            None | Some(Value::Null) => {
                return if self.required {
                    Err(format!("'{}' is required", self.label))
                } else {
                    Ok(())
                }
            }
            Some(value) => value,
        };

        if self.field_type == FieldType::Checkbox {
            return match answer {
                Value::Bool(true) => Ok(()),
                Value::Bool(false) if !self.required => Ok(()),
                Value::Bool(false) => Err(format!("'{}' must be checked", self.label)),
                _ => Err(format!("'{}' must be true or false", self.label)),
            };
        }

        let text = match answer {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) if self.field_type == FieldType::Number => n.to_string(),
            _ => return Err(format!("'{}' must be text", self.label)),
        };
        if text.is_empty() {
            return if self.required {
                Err(format!("'{}' is required", self.label))
            } else {
                Ok(())
            };
        }

        let valid = match self.field_type {
            FieldType::Text | FieldType::Textarea => true,
            FieldType::Number => text.parse::<f64>().is_ok_and(f64::is_finite),
            FieldType::Email => text.contains('@') && text.len() >= 3,
            FieldType::Date => NaiveDate::parse_from_str(&text, "%Y-%m-%d").is_ok(),
            FieldType::Select => self.choices.iter().any(|c| c == &text),
            FieldType::Checkbox => false,
        };
        if valid {
            Ok(())
        } else {
            Err(format!("'{}' is not a valid {}", self.label, self.field_type))
        }
    }
}

/// Validates a submission against the form's fields
///
/// Collects every problem instead of stopping at the first one.
pub fn validate_answers(fields: &[FormField], answers: &BTreeMap<Uuid, Value>) -> DomainResult<()> {
    let mut problems: Vec<String> = fields
        .iter()
        .filter_map(|field| field.check(answers.get(&field.id)).err())
        .collect();

    for key in answers.keys() {
        if !fields.iter().any(|f| &f.id == key) {
            problems.push(format!("Unknown field {}", key));
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(DomainError::validation(problems.join("; ")))
    }
}

/// A registrant's answers to a form
#[derive(Debug, Clone, Serialize)]
pub struct FormResponse {
    pub id: Uuid,
    pub form_id: Uuid,
    pub registration_id: Uuid,
    pub answers: BTreeMap<Uuid, Value>,
    pub submitted_at: DateTime<Utc>,
}

impl FormResponse {
    pub fn submit(
        form: &DynamicForm,
        fields: &[FormField],
        registration_id: Uuid,
        answers: BTreeMap<Uuid, Value>,
    ) -> DomainResult<Self> {
        if !form.is_active {
            return Err(DomainError::validation("This form is no longer accepting responses"));
        }
        validate_answers(fields, &answers)?;
        Ok(Self {
            id: Uuid::new_v4(),
            form_id: form.id,
            registration_id,
            answers,
            submitted_at: Utc::now(),
        })
    }
}
