use std::fmt;

#[cfg(feature = "serde")]
use serde::Serialize;
use thiserror::Error;

/// Why a `DD/MM/YYYY` string was refused.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateError {
    #[error("date must be formatted as DD/MM/YYYY")]
    Malformed,
    #[error("day {0:02} is outside 01-31")]
    DayOutOfRange(u32),
    #[error("month {0:02} is outside 01-12")]
    MonthOutOfRange(u32),
    #[error("{day:02}/{month:02}/{year:04} is not a day of the calendar")]
    NonexistentDay { day: u32, month: u32, year: i32 },
    #[error("a period cannot end on 31/12/9999, the following day has no four digit year")]
    LastCalendarDay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ErrorKind {
    /// Missing field, bad length, illegal characters, wrong period count.
    Shape,
    DateSyntax,
    DateOrder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum PathSegment {
    Field(&'static str),
    Index(usize),
}

/// Location of an offending field inside the request, e.g. `periods[3].endDate`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    pub fn field(name: &'static str) -> Self {
        Self(vec![PathSegment::Field(name)])
    }

    pub fn period(index: usize, name: &'static str) -> Self {
        Self(vec![
            PathSegment::Field("periods"),
            PathSegment::Index(index),
            PathSegment::Field(name),
        ])
    }

    /// A whole entry of the `periods` list.
    pub fn period_entry(index: usize) -> Self {
        Self(vec![PathSegment::Field("periods"), PathSegment::Index(index)])
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if idx == 0 => f.write_str(name)?,
                PathSegment::Field(name) => write!(f, ".{name}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[error("{path}: {reason}")]
pub struct ValidationError {
    pub path: FieldPath,
    pub kind: ErrorKind,
    pub reason: String,
}

/// Every violation found in one request, in the order the fields were checked.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid request: {}", summarize(.0))]
pub struct ValidationErrors(pub(crate) Vec<ValidationError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has_kind(&self, kind: ErrorKind) -> bool {
        self.0.iter().any(|error| error.kind == kind)
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),
    /// Assembly failed on input that passed validation. Always a defect.
    #[error("calendar generation failed: {0}")]
    Generation(String),
}
