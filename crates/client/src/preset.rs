//! Saved analytics filter preset.
//!
//! Stored as one JSON document under [`PRESET_KEY`]. Older documents wrote
//! unset fields as empty strings, so those read back as `None`.

use std::fmt::Display;
use std::str::FromStr;

use appetit_core::{AnalyticsPeriod, DishSortField, Fulfillment, SortOrder};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};

use crate::api::AnalyticsFilter;
use crate::store::{KeyValueStore, StoreError};

/// Storage key for the preset.
pub const PRESET_KEY: &str = "analyticsFilterPreset";

/// Analytics filters as they were when the user saved them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsFilterPreset {
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub from_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub to_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub period: Option<AnalyticsPeriod>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub fulfillment: Option<Fulfillment>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub dish_sort_by: Option<DishSortField>,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub dish_sort_order: Option<SortOrder>,
    pub saved_at: DateTime<Utc>,
}

impl AnalyticsFilterPreset {
    /// Capture `filter` with the given save time.
    #[must_use]
    pub const fn capture(filter: &AnalyticsFilter, saved_at: DateTime<Utc>) -> Self {
        Self {
            from_date: filter.from,
            to_date: filter.to,
            period: Some(filter.period),
            fulfillment: filter.fulfillment,
            dish_sort_by: Some(filter.sort_by),
            dish_sort_order: Some(filter.order),
            saved_at,
        }
    }

    /// Filters to apply, with defaults for anything the preset left unset.
    #[must_use]
    pub fn to_filter(&self) -> AnalyticsFilter {
        AnalyticsFilter {
            from: self.from_date,
            to: self.to_date,
            period: self.period.unwrap_or_default(),
            fulfillment: self.fulfillment,
            sort_by: self.dish_sort_by.unwrap_or_default(),
            order: self.dish_sort_order.unwrap_or_default(),
        }
    }
}

/// Persist `preset`, replacing any previous one.
///
/// # Errors
///
/// Returns an error if the preset cannot be serialized or stored.
pub fn save_preset(
    store: &dyn KeyValueStore,
    preset: &AnalyticsFilterPreset,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(preset).map_err(|source| StoreError::Value {
        key: PRESET_KEY.to_owned(),
        source,
    })?;
    store.set(PRESET_KEY, &raw)
}

/// Read the saved preset, if any.
///
/// # Errors
///
/// Returns an error if the store cannot be read or the saved value is not a
/// valid preset.
pub fn load_preset(store: &dyn KeyValueStore) -> Result<Option<AnalyticsFilterPreset>, StoreError> {
    store
        .get(PRESET_KEY)?
        .map(|raw| {
            serde_json::from_str(&raw).map_err(|source| StoreError::Value {
                key: PRESET_KEY.to_owned(),
                source,
            })
        })
        .transpose()
}

fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(de::Error::custom),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::store::MemoryStore;

    fn saved_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_save_then_load() {
        let store = MemoryStore::new();
        let filter = AnalyticsFilter {
            from: NaiveDate::from_ymd_opt(2024, 1, 1),
            to: NaiveDate::from_ymd_opt(2024, 1, 31),
            period: AnalyticsPeriod::Week,
            fulfillment: Some(Fulfillment::Pickup),
            sort_by: DishSortField::Revenue,
            order: SortOrder::Asc,
        };

        save_preset(&store, &AnalyticsFilterPreset::capture(&filter, saved_at())).unwrap();
        let loaded = load_preset(&store).unwrap().unwrap();

        assert_eq!(loaded.to_filter(), filter);
        assert_eq!(loaded.saved_at, saved_at());
    }

    #[test]
    fn test_stored_keys_are_camel_case() {
        let store = MemoryStore::new();
        let preset = AnalyticsFilterPreset::capture(&AnalyticsFilter::default(), saved_at());
        save_preset(&store, &preset).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&store.get(PRESET_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(raw["dishSortBy"], "qty");
        assert_eq!(raw["dishSortOrder"], "desc");
        assert_eq!(raw["period"], "day");
        assert!(raw.get("fromDate").is_none());
        assert!(raw["savedAt"].is_string());
    }

    #[test]
    fn test_blank_fields_read_as_unset() {
        let store = MemoryStore::new();
        store
            .set(
                PRESET_KEY,
                r#"{"fromDate":"","toDate":"2024-02-10","period":"month","fulfillment":"",
                   "dishSortBy":"","dishSortOrder":"asc","savedAt":"2024-03-01T12:00:00.000Z"}"#,
            )
            .unwrap();

        let filter = load_preset(&store).unwrap().unwrap().to_filter();
        assert_eq!(filter.from, None);
        assert_eq!(filter.to, NaiveDate::from_ymd_opt(2024, 2, 10));
        assert_eq!(filter.period, AnalyticsPeriod::Month);
        assert_eq!(filter.fulfillment, None);
        assert_eq!(filter.sort_by, DishSortField::Qty);
        assert_eq!(filter.order, SortOrder::Asc);
    }

    #[test]
    fn test_missing_preset() {
        assert!(load_preset(&MemoryStore::new()).unwrap().is_none());
    }

    #[test]
    fn test_garbage_preset_is_an_error() {
        let store = MemoryStore::new();
        store.set(PRESET_KEY, "{not json").unwrap();
        assert!(matches!(
            load_preset(&store),
            Err(StoreError::Value { .. })
        ));
    }
}
