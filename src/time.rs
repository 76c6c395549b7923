use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::ops::Deref;

/// Custom time type that wraps chrono::DateTime and serializes as the
/// epoch-milliseconds integers the API uses for timestamp fields such as
/// `created_date` and `last_update_date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(pub DateTime<Utc>);

impl Timestamp {
    /// Create a new Timestamp from a DateTime
    pub fn new(dt: DateTime<Utc>) -> Self {
        Timestamp(dt)
    }

    /// Create a Timestamp from epoch milliseconds
    pub fn from_millis(millis: i64) -> Self {
        Timestamp(Utc.timestamp_millis_opt(millis).unwrap())
    }

    /// Get the timestamp in epoch milliseconds
    pub fn millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Get a formatted date string
    pub fn iso(&self) -> String {
        self.0.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Timestamp::from_millis(0)
    }
}

impl Deref for Timestamp {
    type Target = DateTime<Utc>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Timestamp(dt)
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(t: Timestamp) -> Self {
        t.0
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(self.millis())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = i64::deserialize(deserializer)?;
        match Utc.timestamp_millis_opt(millis).single() {
            Some(dt) => Ok(Timestamp(dt)),
            None => Err(serde::de::Error::custom(format!(
                "timestamp out of range: {}",
                millis
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json;

    #[test]
    fn test_timestamp_serialization() {
        let time = Timestamp::from_millis(1597242491747);
        let json = serde_json::to_string(&time).unwrap();

        assert_eq!(json, "1597242491747");
    }

    #[test]
    fn test_timestamp_deserialization() {
        let time: Timestamp = serde_json::from_str("1597242491747").unwrap();

        assert_eq!(time.millis(), 1597242491747);
        assert_eq!(time.iso(), "2020-08-12 14:28:11");
    }

    #[test]
    fn test_timestamp_null() {
        let json = "null";
        let result: Result<Option<Timestamp>, _> = serde_json::from_str(json);
        assert!(result.is_ok());
        assert!(result.unwrap().is_none());
    }

    #[test]
    fn test_timestamp_default_is_epoch() {
        assert_eq!(Timestamp::default().millis(), 0);
    }

    #[test]
    fn test_timestamp_out_of_range() {
        let result: Result<Timestamp, _> = serde_json::from_str("9223372036854775807");
        assert!(result.is_err());
    }
}
