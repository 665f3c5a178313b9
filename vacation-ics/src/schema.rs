use tracing::debug;

use crate::date::{exclusive_end, is_ordered, parse_date};
use crate::{
    DateError, DisplayName, ErrorKind, ExportRequest, FieldPath, Period, RawExportRequest,
    RawPeriod, ValidationError, ValidationErrors,
};

pub const DEFAULT_TIME_ZONE: &str = "Europe/Paris";

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 50;
pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 500;
pub const MAX_PERIODS: usize = 50;

struct Violations<'a> {
    found: Vec<ValidationError>,
    mistyped: &'a [FieldPath],
}

impl<'a> Violations<'a> {
    fn new(mistyped: &'a [FieldPath]) -> Self {
        Self {
            found: Vec::new(),
            mistyped,
        }
    }

    fn push(&mut self, path: FieldPath, kind: ErrorKind, reason: impl Into<String>) {
        self.found.push(ValidationError {
            path,
            kind,
            reason: reason.into(),
        });
    }

    fn shape(&mut self, path: FieldPath, reason: impl Into<String>) {
        self.push(path, ErrorKind::Shape, reason);
    }

    /// Reports `path` if the body carried it with the wrong JSON type.
    fn mistyped(&mut self, path: &FieldPath, expected: &str) -> bool {
        if !self.mistyped.contains(path) {
            return false;
        }
        self.shape(path.clone(), format!("{path} must be {expected}"));
        true
    }

    /// An absent field, unless it was present but of the wrong type.
    fn missing(&mut self, path: FieldPath, reason: impl Into<String>) {
        if !self.mistyped(&path, "a string") {
            self.shape(path, reason);
        }
    }

    fn count(&self) -> usize {
        self.found.len()
    }
}

/// Checks a raw request and either returns the typed request or every
/// violation found, never just the first one.
pub fn validate(raw: &RawExportRequest) -> Result<ExportRequest, ValidationErrors> {
    let mut violations = Violations::new(&raw.mistyped);

    let display_name = check_display_name(raw.display_name.as_deref(), &mut violations);
    let periods = check_periods(raw.periods.as_deref(), &mut violations);
    violations.mistyped(&FieldPath::field("timeZoneLabel"), "a string");

    let time_zone_label = raw
        .time_zone_label
        .clone()
        .unwrap_or_else(|| DEFAULT_TIME_ZONE.to_string());

    match (display_name, periods) {
        (Some(display_name), Some(periods)) if violations.count() == 0 => Ok(ExportRequest {
            display_name,
            periods,
            time_zone_label,
        }),
        _ => {
            debug!(violations = violations.count(), "export request rejected");
            Err(ValidationErrors(violations.found))
        }
    }
}

impl TryFrom<&RawExportRequest> for ExportRequest {
    type Error = ValidationErrors;

    fn try_from(raw: &RawExportRequest) -> Result<Self, Self::Error> {
        validate(raw)
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphabetic()
        || (('\u{C0}'..='\u{FF}').contains(&c) && c != '\u{D7}' && c != '\u{F7}')
        || c.is_whitespace()
        || c == '\''
        || c == '-'
}

fn check_display_name(raw: Option<&str>, violations: &mut Violations) -> Option<DisplayName> {
    let path = || FieldPath::field("displayName");

    let Some(name) = raw else {
        violations.missing(path(), "display name is required");
        return None;
    };

    let before = violations.count();
    let chars = name.chars().count();

    if chars < NAME_MIN_CHARS {
        violations.shape(
            path(),
            format!("display name must contain at least {NAME_MIN_CHARS} characters"),
        );
    }
    if chars > NAME_MAX_CHARS {
        violations.shape(
            path(),
            format!("display name must not exceed {NAME_MAX_CHARS} characters"),
        );
    }
    if !name.chars().all(is_name_char) {
        violations.shape(
            path(),
            "display name may only contain letters, spaces, apostrophes and hyphens",
        );
    }

    (violations.count() == before).then(|| DisplayName(name.to_string()))
}

fn check_periods(raw: Option<&[RawPeriod]>, violations: &mut Violations) -> Option<Vec<Period>> {
    let periods = raw.unwrap_or_default();
    let before = violations.count();

    let list = FieldPath::field("periods");
    if periods.is_empty() && !violations.mistyped(&list, "a list") {
        violations.shape(list, "at least one period is required");
    }
    if periods.len() > MAX_PERIODS {
        violations.shape(
            FieldPath::field("periods"),
            format!("at most {MAX_PERIODS} periods are allowed"),
        );
    }

    // every period is visited, even after a bad one
    let checked = periods
        .iter()
        .enumerate()
        .map(|(index, period)| {
            let entry = FieldPath::period_entry(index);
            if violations.mistyped(&entry, "an object") {
                return None;
            }
            check_period(index, period, violations)
        })
        .collect::<Vec<_>>();

    if violations.count() == before {
        checked.into_iter().collect()
    } else {
        None
    }
}

fn check_period(index: usize, raw: &RawPeriod, violations: &mut Violations) -> Option<Period> {
    let before = violations.count();

    let start = check_date(index, "startDate", raw.start_date.as_deref(), violations);
    let end = check_date(index, "endDate", raw.end_date.as_deref(), violations);

    // ordering only makes sense once both sides parsed
    if let (Some(start), Some(end)) = (start, end) {
        if !is_ordered(start, end) {
            violations.push(
                FieldPath::period(index, "endDate"),
                ErrorKind::DateOrder,
                "end date must be on or after the start date",
            );
        }
    }
    if let Some(end) = end {
        if exclusive_end(end).is_none() {
            violations.push(
                FieldPath::period(index, "endDate"),
                ErrorKind::DateSyntax,
                DateError::LastCalendarDay.to_string(),
            );
        }
    }

    let title = match raw.title.as_deref() {
        None => {
            violations.missing(FieldPath::period(index, "title"), "title is required");
            None
        }
        Some("") => {
            violations.shape(FieldPath::period(index, "title"), "title is required");
            None
        }
        Some(title) if title.chars().count() > TITLE_MAX_CHARS => {
            violations.shape(
                FieldPath::period(index, "title"),
                format!("title must not exceed {TITLE_MAX_CHARS} characters"),
            );
            None
        }
        Some(title) => Some(title.to_string()),
    };

    let description_path = FieldPath::period(index, "description");
    match raw.description.as_deref() {
        None => {
            violations.mistyped(&description_path, "a string");
        }
        Some(description) if description.chars().count() > DESCRIPTION_MAX_CHARS => {
            violations.shape(
                description_path,
                format!("description must not exceed {DESCRIPTION_MAX_CHARS} characters"),
            );
        }
        Some(_) => {}
    }

    if violations.count() != before {
        return None;
    }

    Some(Period {
        start: start?,
        end: end?,
        title: title?,
        description: raw.description.clone(),
    })
}

fn check_date(
    index: usize,
    field: &'static str,
    raw: Option<&str>,
    violations: &mut Violations,
) -> Option<chrono::NaiveDate> {
    let path = FieldPath::period(index, field);

    let Some(raw) = raw else {
        violations.missing(path, format!("{field} is required"));
        return None;
    };

    match parse_date(raw) {
        Ok(date) => Some(date),
        Err(err) => {
            violations.push(path, ErrorKind::DateSyntax, err.to_string());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jean_dupont() -> RawExportRequest {
        RawExportRequest {
            display_name: Some("Jean Dupont".into()),
            periods: Some(vec![RawPeriod::new(
                "01/01/2026",
                "15/01/2026",
                "Vacances hiver",
            )]),
            ..RawExportRequest::default()
        }
    }

    fn paths(errors: &ValidationErrors) -> Vec<String> {
        errors.errors().iter().map(|e| e.path.to_string()).collect()
    }

    #[test]
    fn accepts_a_valid_request_and_fills_the_default_label() {
        let request = validate(&jean_dupont()).unwrap();

        assert_eq!(request.display_name().as_str(), "Jean Dupont");
        assert_eq!(request.time_zone_label(), DEFAULT_TIME_ZONE);
        assert_eq!(request.periods().len(), 1);
        assert_eq!(request.periods()[0].title(), "Vacances hiver");
        assert_eq!(request.periods()[0].description(), None);
    }

    #[test]
    fn keeps_a_supplied_label() {
        let mut raw = jean_dupont();
        raw.time_zone_label = Some("America/Montreal".into());

        let request = validate(&raw).unwrap();
        assert_eq!(request.time_zone_label(), "America/Montreal");
    }

    #[test]
    fn accepts_names_with_accents_apostrophes_and_hyphens() {
        for name in ["Jean", "Jean-Pierre", "O'Connor", "François Müller", "Zoë"] {
            let mut raw = jean_dupont();
            raw.display_name = Some(name.into());
            assert!(validate(&raw).is_ok(), "{name}");
        }
    }

    #[test]
    fn rejects_bad_names() {
        for name in ["J", "", "Jean123", "Jean_Dupont", "Jean × Dupont", "Łukasz"] {
            let mut raw = jean_dupont();
            raw.display_name = Some(name.into());
            let errors = validate(&raw).unwrap_err();
            assert_eq!(paths(&errors), ["displayName"], "{name}");
            assert!(errors.has_kind(ErrorKind::Shape));
        }

        let mut raw = jean_dupont();
        raw.display_name = Some("A".repeat(51));
        assert!(validate(&raw).is_err());

        raw.display_name = Some("A".repeat(50));
        assert!(validate(&raw).is_ok());
    }

    #[test]
    fn name_length_counts_characters_not_bytes() {
        let mut raw = jean_dupont();
        raw.display_name = Some("é".repeat(50));
        assert!(validate(&raw).is_ok());
    }

    #[test]
    fn requires_between_one_and_fifty_periods() {
        let mut raw = jean_dupont();
        raw.periods = Some(Vec::new());
        assert_eq!(paths(&validate(&raw).unwrap_err()), ["periods"]);

        raw.periods = None;
        assert_eq!(paths(&validate(&raw).unwrap_err()), ["periods"]);

        let period = RawPeriod::new("01/01/2026", "02/01/2026", "Pont");
        raw.periods = Some(vec![period.clone(); MAX_PERIODS]);
        assert_eq!(validate(&raw).unwrap().periods().len(), MAX_PERIODS);

        raw.periods = Some(vec![period; MAX_PERIODS + 1]);
        assert_eq!(paths(&validate(&raw).unwrap_err()), ["periods"]);
    }

    #[test]
    fn rejects_end_before_start_on_the_end_field() {
        let mut raw = jean_dupont();
        raw.periods = Some(vec![RawPeriod::new("15/01/2026", "01/01/2026", "Vacances")]);

        let errors = validate(&raw).unwrap_err();
        assert_eq!(paths(&errors), ["periods[0].endDate"]);
        assert_eq!(errors.errors()[0].kind, ErrorKind::DateOrder);
    }

    #[test]
    fn same_day_period_is_valid() {
        let mut raw = jean_dupont();
        raw.periods = Some(vec![RawPeriod::new("14/07/2026", "14/07/2026", "Fête")]);

        let request = validate(&raw).unwrap();
        assert_eq!(request.periods()[0].start(), request.periods()[0].end());
    }

    #[test]
    fn skips_ordering_when_a_date_is_malformed() {
        let mut raw = jean_dupont();
        raw.periods = Some(vec![RawPeriod::new("invalid", "01/01/2026", "Test")]);

        let errors = validate(&raw).unwrap_err();
        assert_eq!(paths(&errors), ["periods[0].startDate"]);
        assert_eq!(errors.errors()[0].kind, ErrorKind::DateSyntax);
        assert!(!errors.has_kind(ErrorKind::DateOrder));
    }

    #[test]
    fn bounds_title_and_description() {
        let mut raw = jean_dupont();
        raw.periods = Some(vec![
            RawPeriod::new("01/01/2026", "02/01/2026", ""),
            RawPeriod::new("01/01/2026", "02/01/2026", "x".repeat(101).as_str()),
            RawPeriod::new("01/01/2026", "02/01/2026", "x".repeat(100).as_str())
                .with_description("d".repeat(501)),
            RawPeriod::new("01/01/2026", "02/01/2026", "ok").with_description("d".repeat(500)),
            RawPeriod {
                title: None,
                ..RawPeriod::new("01/01/2026", "02/01/2026", "")
            },
        ]);

        let errors = validate(&raw).unwrap_err();
        assert_eq!(
            paths(&errors),
            [
                "periods[0].title",
                "periods[1].title",
                "periods[2].description",
                "periods[4].title",
            ]
        );
    }

    #[test]
    fn aggregates_every_violation() {
        let raw = RawExportRequest {
            display_name: Some("J".into()),
            periods: Some(vec![
                RawPeriod::new("32/01/2026", "2026-01-15", ""),
                RawPeriod::new("15/01/2026", "01/01/2026", "Retour"),
                RawPeriod {
                    start_date: None,
                    ..RawPeriod::new("", "31/02/2026", "Février")
                },
            ]),
            ..RawExportRequest::default()
        };

        let errors = validate(&raw).unwrap_err();
        assert_eq!(
            paths(&errors),
            [
                "displayName",
                "periods[0].startDate",
                "periods[0].endDate",
                "periods[0].title",
                "periods[1].endDate",
                "periods[2].startDate",
                "periods[2].endDate",
            ]
        );
        let kinds = errors.errors().iter().map(|e| e.kind).collect::<Vec<_>>();
        assert_eq!(
            kinds,
            [
                ErrorKind::Shape,
                ErrorKind::DateSyntax,
                ErrorKind::DateSyntax,
                ErrorKind::Shape,
                ErrorKind::DateOrder,
                ErrorKind::Shape,
                ErrorKind::DateSyntax,
            ]
        );
    }

    #[test]
    fn refuses_an_end_on_the_last_calendar_day() {
        let mut raw = jean_dupont();
        raw.periods = Some(vec![
            RawPeriod::new("30/12/9999", "30/12/9999", "Avant-dernier"),
            RawPeriod::new("30/12/9999", "31/12/9999", "Fin"),
        ]);

        let errors = validate(&raw).unwrap_err();
        assert_eq!(paths(&errors), ["periods[1].endDate"]);
        assert_eq!(errors.errors()[0].kind, ErrorKind::DateSyntax);
        assert_eq!(
            errors.errors()[0].reason,
            DateError::LastCalendarDay.to_string()
        );
    }

    #[test]
    fn reports_mistyped_fields_among_the_others() {
        let raw = RawExportRequest {
            display_name: None,
            periods: Some(vec![
                RawPeriod {
                    title: None,
                    description: None,
                    ..RawPeriod::new("invalid", "15/01/2026", "")
                },
                RawPeriod::default(),
            ]),
            time_zone_label: None,
            mistyped: vec![
                FieldPath::field("displayName"),
                FieldPath::period(0, "title"),
                FieldPath::period(0, "description"),
                FieldPath::period_entry(1),
                FieldPath::field("timeZoneLabel"),
            ],
        };

        let errors = validate(&raw).unwrap_err();
        assert_eq!(
            paths(&errors),
            [
                "displayName",
                "periods[0].startDate",
                "periods[0].title",
                "periods[0].description",
                "periods[1]",
                "timeZoneLabel",
            ]
        );
        let reasons = errors.errors().iter().map(|e| e.reason.as_str()).collect::<Vec<_>>();
        assert_eq!(reasons[0], "displayName must be a string");
        assert_eq!(reasons[2], "periods[0].title must be a string");
        assert_eq!(reasons[4], "periods[1] must be an object");
        assert_eq!(errors.errors()[1].kind, ErrorKind::DateSyntax);
    }

    #[test]
    fn mistyped_period_list_replaces_the_missing_one() {
        let raw = RawExportRequest {
            display_name: Some("Jean Dupont".into()),
            mistyped: vec![FieldPath::field("periods")],
            ..RawExportRequest::default()
        };

        let errors = validate(&raw).unwrap_err();
        assert_eq!(paths(&errors), ["periods"]);
        assert_eq!(errors.errors()[0].reason, "periods must be a list");
    }

    #[test]
    fn revalidating_is_idempotent() {
        let mut raw = jean_dupont();
        raw.periods = Some(vec![
            RawPeriod::new("01/01/2026", "15/01/2026", "Vacances hiver")
                .with_description("Repos hivernal"),
            RawPeriod::new("15/07/2026", "31/07/2026", "Été"),
        ]);
        raw.time_zone_label = Some("Europe/Brussels".into());

        let first = validate(&raw).unwrap();
        let second = ExportRequest::try_from(&RawExportRequest::from(&first)).unwrap();

        assert_eq!(first, second);
    }
}
