//! Turns a person's vacation periods into an iCalendar document.
//!
//! A [`RawExportRequest`] is checked by [`validate`], which reports every
//! offending field at once, and the resulting [`ExportRequest`] is rendered
//! by a [`CalendarExporter`] into one all-day `VEVENT` per period.

mod date;
mod error;
mod filename;
mod ics;
mod schema;
mod structs;
mod uid;

pub use date::{exclusive_end, format_date, ics_date, inclusive_days, is_ordered, parse_date};
pub use error::{
    DateError, ErrorKind, ExportError, FieldPath, PathSegment, ValidationError, ValidationErrors,
};
pub use filename::{suggested_file_name, SuggestedFileName, FILE_EXTENSION, FILE_PREFIX};
pub use self::ics::{Branding, CalendarDocument, CalendarExporter, Export, MEDIA_TYPE};
pub use schema::{
    validate, DEFAULT_TIME_ZONE, DESCRIPTION_MAX_CHARS, MAX_PERIODS, NAME_MAX_CHARS,
    NAME_MIN_CHARS, TITLE_MAX_CHARS,
};
pub use structs::{DisplayName, ExportRequest, Period, RawExportRequest, RawPeriod};
pub use uid::{StampedUids, UidGenerator};
