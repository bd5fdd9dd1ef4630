use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use fieldcheck_core::{CheckFactory, Kind, Value, factory, predicate};

use crate::support::unsupported;

fn relative_to_now(test: fn(DateTime<Utc>, DateTime<Utc>) -> bool) -> CheckFactory {
    factory(move |field, check| {
        if !matches!(field.kind(), Kind::Time | Kind::String) {
            return Err(unsupported(field, check, "time or string field required"));
        }
        Ok(predicate(move |_, value| {
            Ok(to_time(value).is_some_and(|actual| test(actual, Utc::now())))
        }))
    })
}

/// `past`: strictly before now.
pub fn past() -> CheckFactory {
    relative_to_now(|actual, now| actual < now)
}

/// `future`: strictly after now.
pub fn future() -> CheckFactory {
    relative_to_now(|actual, now| actual > now)
}

/// Time values as-is; text as RFC 3339 or `YYYY-MM-DD` (midnight UTC).
pub(crate) fn to_time(value: &Value<'_>) -> Option<DateTime<Utc>> {
    match value {
        Value::Time(time) => Some(*time),
        Value::Str(text) if !text.is_empty() => {
            if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
                return Some(parsed.with_timezone(&Utc));
            }
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::default()).and_utc())
        }
        _ => None,
    }
}
