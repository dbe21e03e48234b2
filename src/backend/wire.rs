//! Lenient decoders for fields whose encoding drifted between server builds.

use chrono::NaiveDate;
use serde::{de, Deserialize, Deserializer};

use crate::constants::COMPLETION_RATE_MAX;
use crate::utils::datetime;

#[derive(Deserialize)]
#[serde(untagged)]
enum BoolRepr {
    Bool(bool),
    Int(i64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RateRepr {
    Int(i64),
    Float(f64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListRepr {
    Id(i64),
    Text(String),
    Nested { id: i64 },
}

/// `true`, `1`, `"TRUE"`, `"true"` and `"1"` all decode to `true`; null to `false`.
pub fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<BoolRepr>::deserialize(deserializer)? {
        None => Ok(false),
        Some(BoolRepr::Bool(value)) => Ok(value),
        Some(BoolRepr::Int(value)) => Ok(value != 0),
        Some(BoolRepr::Text(text)) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" | "" => Ok(false),
            other => Err(de::Error::custom(format!("invalid boolean: {}", other))),
        },
    }
}

/// Completion rate as an integer, float or numeric string within 0..=100.
pub fn flexible_rate<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Option::<RateRepr>::deserialize(deserializer)? {
        None => 0,
        Some(RateRepr::Int(value)) => value,
        Some(RateRepr::Float(value)) => value.round() as i64,
        Some(RateRepr::Text(text)) => text
            .trim()
            .parse::<f64>()
            .map(|v| v.round() as i64)
            .map_err(|_| de::Error::custom(format!("invalid completion rate: {}", text)))?,
    };

    u8::try_from(value)
        .ok()
        .filter(|rate| *rate <= COMPLETION_RATE_MAX)
        .ok_or_else(|| de::Error::custom(format!("completion rate out of range: {}", value)))
}

/// Owning list as a bare id, a numeric string or a nested list object.
pub fn list_reference<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match ListRepr::deserialize(deserializer)? {
        ListRepr::Id(id) | ListRepr::Nested { id } => Ok(id),
        ListRepr::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid list reference: {}", text))),
    }
}

/// Deadline as `YYYY-MM-DD`, a full timestamp (date part kept), empty or null.
pub fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(text) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }

    let date_part = text.get(..10).unwrap_or(text);
    datetime::parse_date(date_part)
        .map(Some)
        .map_err(|e| de::Error::custom(format!("invalid deadline '{}': {}", text, e)))
}
