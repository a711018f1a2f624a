// Forms domain module
// Per-league custom registration questions and their answers

pub mod form;

pub use form::{validate_answers, DynamicForm, FieldType, FormField, FormResponse};
