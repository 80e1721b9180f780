//! Timestamp helpers.

use chrono::{DateTime, Local, Utc};

/// Returns the current UTC time as an ISO 8601 formatted string.
///
/// Format: `YYYY-MM-DDTHH:MM:SS.ffffff+00:00`
///
/// # Examples
///
/// ```
/// use devflow::utils::iso_timestamp;
///
/// let ts = iso_timestamp();
/// assert!(ts.contains('T'));
/// assert!(ts.ends_with("+00:00"));
/// ```
#[must_use]
pub fn iso_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.6f+00:00").to_string()
}

/// Returns local time formatted for document headers (`YYYY-MM-DD HH:MM:SS`).
#[must_use]
pub fn display_timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Returns today's local date (`YYYY-MM-DD`), used for changelog headings.
#[must_use]
pub fn date_stamp() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Builds a project id of the form `project_YYYYmmdd_HHMMSS`.
#[must_use]
pub fn project_id_at(at: DateTime<Local>) -> String {
    format!("project_{}", at.format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_iso_timestamp_format() {
        let ts = iso_timestamp();
        assert!(ts.contains('T'));
        assert!(ts.ends_with("+00:00"));
    }

    #[test]
    fn test_display_timestamp_shape() {
        let ts = display_timestamp();
        assert_eq!(ts.len(), 19);
        assert_eq!(&ts[4..5], "-");
        assert_eq!(&ts[10..11], " ");
    }

    #[test]
    fn test_project_id_at() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(project_id_at(at), "project_20240309_070501");
    }
}
