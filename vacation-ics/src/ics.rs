use std::fmt;

use chrono::{DateTime, Utc};
use ics::{
    components::{Parameter, Property},
    escape_text,
    properties::{Categories, Description, DtEnd, DtStart, Organizer, Status, Summary, Transp},
    ICalendar,
};
use tracing::{debug, info};

use crate::date::{exclusive_end, ics_date, inclusive_days};
use crate::filename::{compact_slug, suggested_file_name};
use crate::{
    validate, ExportError, ExportRequest, Period, RawExportRequest, StampedUids,
    SuggestedFileName, UidGenerator,
};

pub const MEDIA_TYPE: &str = "text/calendar; charset=utf-8";

const LEAVE_CATEGORY: &str = "Vacances";

/// Fixed identity stamped into every exported calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branding {
    pub product_name: String,
    pub product_id: String,
    pub organizer_email: String,
    pub uid_domain: String,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            product_name: "PGV Planning".into(),
            product_id: "PGV Planning V9".into(),
            organizer_email: "noreply@pgvplanning.fr".into(),
            uid_domain: "pgvplanning.fr".into(),
        }
    }
}

/// A serialized VCALENDAR, CRLF terminated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDocument(String);

impl CalendarDocument {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn event_count(&self) -> usize {
        self.0
            .split("\r\n")
            .filter(|line| *line == "BEGIN:VEVENT")
            .count()
    }
}

impl fmt::Display for CalendarDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub document: CalendarDocument,
    pub file_name: SuggestedFileName,
}

#[derive(Debug, Clone, Default)]
pub struct CalendarExporter {
    branding: Branding,
}

impl CalendarExporter {
    pub fn new(branding: Branding) -> Self {
        Self { branding }
    }

    pub fn branding(&self) -> &Branding {
        &self.branding
    }

    /// Validates `raw` and renders it with clock-derived UIDs and timestamp.
    pub fn export(&self, raw: &RawExportRequest) -> Result<Export, ExportError> {
        let request = validate(raw)?;
        let mut uids = StampedUids::from_clock(self.branding.uid_domain.as_str());
        self.export_with(&request, &mut uids, Utc::now())
    }

    /// Renders an already validated request. Output depends only on the
    /// arguments.
    pub fn export_with<G>(
        &self,
        request: &ExportRequest,
        uids: &mut G,
        generated_at: DateTime<Utc>,
    ) -> Result<Export, ExportError>
    where
        G: UidGenerator + ?Sized,
    {
        let name = request.display_name().as_str();
        let slug = compact_slug(name);
        let dtstamp = generated_at.format("%Y%m%dT%H%M%SZ").to_string();

        let mut calendar = ICalendar::new("2.0", self.branding.product_id.as_str());
        calendar.push(Property::new("METHOD", "PUBLISH"));
        calendar.push(Property::new(
            "X-WR-CALNAME",
            escape_text(format!("{LEAVE_CATEGORY} {name}")),
        ));
        calendar.push(Property::new(
            "X-WR-TIMEZONE",
            escape_text(request.time_zone_label()),
        ));

        for (index, period) in request.periods().iter().enumerate() {
            let uid = uids.next_uid(&slug, index);
            calendar.add_event(period.to_ics(name, uid, dtstamp.clone(), &self.branding)?);

            debug!(
                index,
                start = %period.start(),
                end = %period.end(),
                days = inclusive_days(period.start(), period.end()),
                "period rendered"
            );
        }

        let document = CalendarDocument(calendar.to_string());
        let file_name = suggested_file_name(name, generated_at.date_naive());

        info!(
            display_name = name,
            events = document.event_count(),
            file_name = %file_name,
            "calendar exported"
        );

        Ok(Export {
            document,
            file_name,
        })
    }
}

impl Period {
    fn to_ics<'a>(
        &'a self,
        name: &str,
        uid: String,
        dtstamp: String,
        branding: &'a Branding,
    ) -> Result<ics::Event<'a>, ExportError> {
        let end = exclusive_end(self.end).ok_or_else(|| {
            ExportError::Generation(format!("no day follows the end date {}", self.end))
        })?;

        let mut dtstart = DtStart::new(ics_date(self.start));
        dtstart.add(Parameter::new("VALUE", "DATE"));

        let mut dtend = DtEnd::new(ics_date(end));
        dtend.add(Parameter::new("VALUE", "DATE"));

        let description = match &self.description {
            Some(description) => escape_text(description.as_str()),
            None => escape_text(format!("{LEAVE_CATEGORY} de {name}")),
        };

        let categories = [LEAVE_CATEGORY, branding.product_name.as_str()]
            .map(escape_text)
            .join(",");

        let mut organizer = Organizer::new(format!("mailto:{}", branding.organizer_email));
        organizer.add(Parameter::new(
            "CN",
            format!("\"{}\"", branding.product_name.replace('"', "")),
        ));

        let mut ics_event = ics::Event::new(uid, dtstamp);

        ics_event.push(dtstart);
        ics_event.push(dtend);
        ics_event.push(Summary::new(escape_text(format!("{} - {name}", self.title))));
        ics_event.push(Description::new(description));
        ics_event.push(Transp::new("OPAQUE"));
        ics_event.push(Status::new("CONFIRMED"));
        ics_event.push(Categories::new(categories));
        ics_event.push(Property::new("X-MICROSOFT-CDO-BUSYSTATUS", "OOF"));
        ics_event.push(organizer);

        Ok(ics_event)
    }
}
