use thiserror::Error;

/// Raised by the report renderer when the opaque analysis payload lacks a
/// section it needs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    #[error("no analysis result is available")]
    NoResult,
    #[error("analysis result is missing `{0}`")]
    MissingField(String),
    #[error("analysis result field `{field}` is not {expected}")]
    WrongType {
        field: String,
        expected: &'static str,
    },
}

impl ReportError {
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }

    pub fn wrong_type(field: impl Into<String>, expected: &'static str) -> Self {
        Self::WrongType {
            field: field.into(),
            expected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("unknown profile field `{0}`; expected age, bmi, bp, sugar or lifestyle")]
    UnknownField(String),
    #[error("unknown lifestyle `{0}`; expected Sedentary, Moderate or Active")]
    UnknownLifestyle(String),
}
