use std::fmt;

use chrono::NaiveDate;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::date::format_date;
use crate::FieldPath;

/// Name of the person whose periods are exported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName(pub(crate) String);

impl DisplayName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period {
    pub(crate) start: NaiveDate,
    pub(crate) end: NaiveDate,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
}

impl Period {
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day included in the period.
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// A request that went through the schema gate. Only obtainable from
/// [`crate::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub(crate) display_name: DisplayName,
    pub(crate) periods: Vec<Period>,
    pub(crate) time_zone_label: String,
}

impl ExportRequest {
    pub fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    /// Informational only; no date is ever converted with it.
    pub fn time_zone_label(&self) -> &str {
        &self.time_zone_label
    }
}

/// Request body as received, every field still optional and unchecked.
///
/// Deserializing never fails on a field of the wrong JSON type: the field is
/// left empty and its location recorded in `mistyped`, so that [`crate::validate`]
/// can report it next to every other violation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(rename_all = "camelCase", from = "loose::LooseRequest")
)]
pub struct RawExportRequest {
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub display_name: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub periods: Option<Vec<RawPeriod>>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub time_zone_label: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub mistyped: Vec<FieldPath>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct RawPeriod {
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub start_date: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub end_date: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub title: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub description: Option<String>,
}

impl RawPeriod {
    pub fn new<S: Into<String>>(start_date: S, end_date: S, title: S) -> Self {
        Self {
            start_date: Some(start_date.into()),
            end_date: Some(end_date.into()),
            title: Some(title.into()),
            description: None,
        }
    }

    #[must_use]
    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl From<&Period> for RawPeriod {
    fn from(period: &Period) -> Self {
        Self {
            start_date: Some(format_date(period.start)),
            end_date: Some(format_date(period.end)),
            title: Some(period.title.clone()),
            description: period.description.clone(),
        }
    }
}

impl From<&ExportRequest> for RawExportRequest {
    fn from(request: &ExportRequest) -> Self {
        Self {
            display_name: Some(request.display_name.0.clone()),
            periods: Some(request.periods.iter().map(RawPeriod::from).collect()),
            time_zone_label: Some(request.time_zone_label.clone()),
            mistyped: Vec::new(),
        }
    }
}

#[cfg(feature = "serde")]
mod loose {
    use serde::{de::IgnoredAny, Deserialize};

    use super::{RawExportRequest, RawPeriod};
    use crate::FieldPath;

    #[derive(Deserialize)]
    #[serde(untagged)]
    pub enum Loose<T> {
        Expected(T),
        Mistyped(IgnoredAny),
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct LooseRequest {
        #[serde(alias = "employeeName")]
        display_name: Option<Loose<String>>,
        periods: Option<Loose<Vec<Loose<LoosePeriod>>>>,
        #[serde(alias = "timezone")]
        time_zone_label: Option<Loose<String>>,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct LoosePeriod {
        start_date: Option<Loose<String>>,
        end_date: Option<Loose<String>>,
        title: Option<Loose<String>>,
        description: Option<Loose<String>>,
    }

    fn keep<T>(
        field: Option<Loose<T>>,
        path: FieldPath,
        mistyped: &mut Vec<FieldPath>,
    ) -> Option<T> {
        match field? {
            Loose::Expected(value) => Some(value),
            Loose::Mistyped(_) => {
                mistyped.push(path);
                None
            }
        }
    }

    impl LoosePeriod {
        fn into_raw(self, index: usize, mistyped: &mut Vec<FieldPath>) -> RawPeriod {
            let at = |name| FieldPath::period(index, name);

            RawPeriod {
                start_date: keep(self.start_date, at("startDate"), mistyped),
                end_date: keep(self.end_date, at("endDate"), mistyped),
                title: keep(self.title, at("title"), mistyped),
                description: keep(self.description, at("description"), mistyped),
            }
        }
    }

    impl From<LooseRequest> for RawExportRequest {
        fn from(loose: LooseRequest) -> Self {
            let mut mistyped = Vec::new();

            let display_name = keep(
                loose.display_name,
                FieldPath::field("displayName"),
                &mut mistyped,
            );

            let periods = keep(loose.periods, FieldPath::field("periods"), &mut mistyped);
            let periods = periods.map(|entries| {
                let mut periods = Vec::with_capacity(entries.len());
                for (index, entry) in entries.into_iter().enumerate() {
                    match entry {
                        Loose::Expected(period) => {
                            periods.push(period.into_raw(index, &mut mistyped));
                        }
                        Loose::Mistyped(_) => {
                            mistyped.push(FieldPath::period_entry(index));
                            periods.push(RawPeriod::default());
                        }
                    }
                }
                periods
            });

            let time_zone_label = keep(
                loose.time_zone_label,
                FieldPath::field("timeZoneLabel"),
                &mut mistyped,
            );

            Self {
                display_name,
                periods,
                time_zone_label,
                mistyped,
            }
        }
    }
}
