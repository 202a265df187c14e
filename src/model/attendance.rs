use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};
use utoipa::ToSchema;

use crate::utils::csv_utils::join_row;

/// Persisted timestamp layout, e.g. `2026-01-01 09:15:00`.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Layout used in the "Attendance marked at" message.
pub const CLOCK_FORMAT: &str = "%H:%M:%S";

pub const CSV_HEADER: [&str; 2] = ["Name", "Time"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({ "name": "Person 1", "time": "2026-01-01 09:15:00" }))]
pub struct AttendanceRecord {
    #[schema(example = "Person 1")]
    pub name: String,

    #[serde(with = "time_format")]
    #[schema(value_type = String, example = "2026-01-01 09:15:00")]
    pub time: NaiveDateTime,
}

impl AttendanceRecord {
    pub fn new(name: impl Into<String>, time: NaiveDateTime) -> Self {
        Self {
            name: name.into(),
            time,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.time.date()
    }

    /// `Name,Time` line without the trailing newline
    pub fn to_csv_line(&self) -> String {
        let time = self.time.format(TIME_FORMAT).to_string();
        join_row([self.name.as_str(), time.as_str()])
    }

    /// Build a record from parsed CSV fields. Returns `None` for the header
    /// row and for anything that is not a `Name,Time` pair.
    pub fn from_fields(fields: &[String]) -> Option<Self> {
        let [name, time] = fields else {
            return None;
        };
        let time = NaiveDateTime::parse_from_str(time.trim(), TIME_FORMAT).ok()?;
        Some(Self::new(name.clone(), time))
    }
}

pub fn is_header(fields: &[String]) -> bool {
    fields.len() == CSV_HEADER.len()
        && fields
            .iter()
            .zip(CSV_HEADER)
            .all(|(field, expected)| field.trim().eq_ignore_ascii_case(expected))
}

/// Date range (inclusive) and name filter shared by list and export.
#[derive(Debug, Default, Clone)]
pub struct AttendanceFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub name: Option<String>,
}

impl AttendanceFilter {
    pub fn matches(&self, record: &AttendanceRecord) -> bool {
        let date = record.date();

        if self.from.is_some_and(|from| date < from) {
            return false;
        }
        if self.to.is_some_and(|to| date > to) {
            return false;
        }

        match self.name.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => record
                .name
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            _ => true,
        }
    }

    pub fn apply<'a>(
        &'a self,
        records: &'a [AttendanceRecord],
    ) -> impl Iterator<Item = &'a AttendanceRecord> + 'a {
        records.iter().filter(move |r| self.matches(r))
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum SortColumn {
    Name,
    #[default]
    Time,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Row ordering for listings. Defaults to newest first.
#[derive(Debug, Default, Clone, Copy)]
pub struct AttendanceSort {
    pub column: SortColumn,
    pub order: SortOrder,
}

impl AttendanceSort {
    /// Stable sort. Name ties fall back to time; full ties keep file order
    /// ascending and reverse file order descending.
    pub fn sort(&self, records: &mut [AttendanceRecord]) {
        if self.order == SortOrder::Desc {
            records.reverse();
        }

        records.sort_by(|a, b| {
            let ord = match self.column {
                SortColumn::Name => a
                    .name
                    .to_lowercase()
                    .cmp(&b.name.to_lowercase())
                    .then_with(|| a.time.cmp(&b.time)),
                SortColumn::Time => a.time.cmp(&b.time),
            };
            match self.order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AttendanceSummary {
    #[schema(example = 42)]
    pub total_records: usize,

    #[schema(example = 3)]
    pub today_records: usize,

    #[schema(example = 1)]
    pub unique_names: usize,

    #[serde(with = "time_format::option")]
    #[schema(value_type = Option<String>, example = "2026-01-01 09:15:00")]
    pub last_marked_at: Option<NaiveDateTime>,
}

impl AttendanceSummary {
    pub fn from_records(records: &[AttendanceRecord], today: NaiveDate) -> Self {
        let unique_names = records
            .iter()
            .map(|r| r.name.as_str())
            .collect::<HashSet<_>>()
            .len();

        Self {
            total_records: records.len(),
            today_records: records.iter().filter(|r| r.date() == today).count(),
            unique_names,
            last_marked_at: records.iter().map(|r| r.time).max(),
        }
    }
}

mod time_format {
    use super::TIME_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&time.format(TIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&raw, TIME_FORMAT).map_err(serde::de::Error::custom)
    }

    pub mod option {
        use super::TIME_FORMAT;
        use chrono::NaiveDateTime;
        use serde::Serializer;

        pub fn serialize<S: Serializer>(
            time: &Option<NaiveDateTime>,
            s: S,
        ) -> Result<S::Ok, S::Error> {
            match time {
                Some(t) => s.serialize_some(&t.format(TIME_FORMAT).to_string()),
                None => s.serialize_none(),
            }
        }
    }
}
