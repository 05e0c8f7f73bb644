use chrono::SubsecRound;

pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Current UTC time truncated to the millisecond precision tasks are stored with.
pub fn now() -> Timestamp {
  chrono::Utc::now().trunc_subsecs(3)
}

pub fn format_timestamp(timestamp: &Timestamp) -> String {
  timestamp.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

pub fn parse_timestamp(input: &str) -> chrono::ParseResult<Timestamp> {
  let parsed = chrono::DateTime::parse_from_rfc3339(input)?;
  return Ok(parsed.with_timezone(&chrono::Utc).trunc_subsecs(3));
}

/// `YYYY-MM-DD`, used in export file names.
pub fn date_stamp(timestamp: &Timestamp) -> String {
  timestamp.format("%Y-%m-%d").to_string()
}

pub mod iso8601 {
  use serde::Deserialize;

  use super::{format_timestamp, parse_timestamp, Timestamp};

  pub fn serialize<S>(timestamp: &Timestamp, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&format_timestamp(timestamp))
  }

  pub fn deserialize<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
  where
    D: serde::Deserializer<'de>,
  {
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
  }

  pub mod option {
    use serde::Deserialize;

    use super::super::{parse_timestamp, Timestamp};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
    where
      D: serde::Deserializer<'de>,
    {
      match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse_timestamp(&raw)
          .map(Some)
          .map_err(serde::de::Error::custom),
        None => Ok(None),
      }
    }
  }
}
