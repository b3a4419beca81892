//! Date/time utilities for filedrop.

use std::time::SystemTime;

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a filesystem timestamp as RFC3339 in UTC with millisecond precision.
///
/// e.g. `2024-05-01T09:30:00.250Z`
pub fn to_rfc3339(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current time formatted like [`to_rfc3339`].
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_to_rfc3339_epoch() {
        assert_eq!(to_rfc3339(SystemTime::UNIX_EPOCH), "1970-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_to_rfc3339_millis() {
        let time = SystemTime::UNIX_EPOCH + Duration::from_millis(1_714_555_800_250);
        assert_eq!(to_rfc3339(time), "2024-05-01T09:30:00.250Z");
    }

    #[test]
    fn test_now_rfc3339_parses() {
        let now = now_rfc3339();
        assert!(now.ends_with('Z'));
        assert!(DateTime::parse_from_rfc3339(&now).is_ok());
    }
}
