//! Opening hours per weekday and the emergency closure switch.
//!
//! Days are numbered from Monday (0) to Sunday (6). Times travel as `HH:MM`.

use std::collections::BTreeMap;

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::instrument;

use crate::dispatcher::{ApiClient, Request};
use crate::error::ClientError;
use crate::session::Session;

/// Weekdays in the order the backend numbers them.
pub const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Hours for one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayHours {
    #[serde(default, with = "hh_mm")]
    pub open_time: Option<NaiveTime>,
    #[serde(default, with = "hh_mm")]
    pub close_time: Option<NaiveTime>,
    #[serde(default)]
    pub is_closed: bool,
}

/// The weekly schedule, keyed by lowercase English day name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeeklyHours(pub BTreeMap<String, DayHours>);

impl WeeklyHours {
    /// Hours for `day`, if the schedule lists it.
    #[must_use]
    pub fn day(&self, day: Weekday) -> Option<&DayHours> {
        self.0.get(day_name(day))
    }

    /// Listed days from Monday to Sunday.
    pub fn iter(&self) -> impl Iterator<Item = (Weekday, &DayHours)> {
        WEEK.into_iter()
            .filter_map(|day| self.day(day).map(|hours| (day, hours)))
    }
}

/// Lowercase English name of `day`.
#[must_use]
pub const fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

mod hh_mm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de};

    const FORMAT: &str = "%H:%M";

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(time: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error> {
        match time {
            Some(time) => serializer.serialize_str(&time.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => NaiveTime::parse_from_str(s, FORMAT)
                .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
                .map(Some)
                .map_err(de::Error::custom),
        }
    }
}

impl ApiClient {
    /// Read the weekly schedule (admin).
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, session))]
    pub async fn business_hours(
        &self,
        session: Option<&Session>,
    ) -> Result<WeeklyHours, ClientError> {
        self.call(session, Request::get("/admin/business-hours")).await
    }

    /// Replace one day's hours (admin).
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, session, hours), fields(day = %day))]
    pub async fn update_business_day(
        &self,
        session: Option<&Session>,
        day: Weekday,
        hours: &DayHours,
    ) -> Result<Value, ClientError> {
        let path = format!("/admin/business-hours/{}", day.num_days_from_monday());
        self.dispatch(session, Request::put(path).json(hours)?)
            .await
    }

    /// Close or reopen immediately regardless of the schedule (admin).
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, session))]
    pub async fn set_emergency_closure(
        &self,
        session: Option<&Session>,
        closed: bool,
    ) -> Result<Value, ClientError> {
        self.dispatch(
            session,
            Request::post("/admin/business-hours/emergency").with_body(json!({"closed": closed})),
        )
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_weekly_hours_decode_in_week_order() {
        let hours: WeeklyHours = serde_json::from_value(json!({
            "sunday": {"is_closed": false, "open_time": "10:00", "close_time": "21:00"},
            "monday": {"is_closed": false, "open_time": "09:00", "close_time": "22:00"},
            "tuesday": {"is_closed": true, "open_time": null, "close_time": null}
        }))
        .unwrap();

        let days: Vec<Weekday> = hours.iter().map(|(day, _)| day).collect();
        assert_eq!(days, vec![Weekday::Mon, Weekday::Tue, Weekday::Sun]);

        let monday = hours.day(Weekday::Mon).unwrap();
        assert_eq!(monday.open_time, NaiveTime::from_hms_opt(9, 0, 0));
        assert!(hours.day(Weekday::Tue).unwrap().is_closed);
        assert!(hours.day(Weekday::Wed).is_none());
    }

    #[test]
    fn test_day_hours_payload_uses_hh_mm() {
        let hours = DayHours {
            open_time: NaiveTime::from_hms_opt(10, 0, 0),
            close_time: NaiveTime::from_hms_opt(20, 30, 0),
            is_closed: false,
        };
        assert_eq!(
            serde_json::to_value(hours).unwrap(),
            json!({"open_time": "10:00", "close_time": "20:30", "is_closed": false})
        );
    }

    #[test]
    fn test_closed_day_payload() {
        let hours = DayHours {
            is_closed: true,
            ..DayHours::default()
        };
        assert_eq!(
            serde_json::to_value(hours).unwrap(),
            json!({"open_time": null, "close_time": null, "is_closed": true})
        );
    }

    #[test]
    fn test_day_numbering_starts_monday() {
        assert_eq!(Weekday::Mon.num_days_from_monday(), 0);
        assert_eq!(Weekday::Sun.num_days_from_monday(), 6);
        assert_eq!(day_name(WEEK[6]), "sunday");
    }
}
