//! Date bucketing for image files.
//!
//! A bucket is the name of the destination folder a file lands in: either a
//! `"YYYY-MM"` key or the literal `"unknown_date"`. Buckets are derived from
//! the filename first, then from the file's modification time.
//!
//! # Examples
//!
//! ```
//! use datefold::date_bucket::{DateBucket, bucket_from_filename};
//!
//! assert_eq!(
//!     bucket_from_filename("20240101_120000.png"),
//!     Some(DateBucket::year_month("2024", "01"))
//! );
//! assert_eq!(bucket_from_filename("holiday.jpg"), None);
//! assert_eq!(DateBucket::Unknown.dir_name(), "unknown_date");
//! ```

use chrono::{DateTime, Local};
use regex::{Captures, Regex};
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// Directory name used for files whose date could not be determined.
pub const UNKNOWN_DATE_DIR: &str = "unknown_date";

/// Destination folder key for a file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DateBucket {
    /// A year-month folder. Both parts are kept exactly as extracted.
    YearMonth { year: String, month: String },
    /// The catch-all folder for files without a usable date.
    Unknown,
}

impl DateBucket {
    /// Creates a year-month bucket.
    pub fn year_month(year: impl Into<String>, month: impl Into<String>) -> Self {
        DateBucket::YearMonth {
            year: year.into(),
            month: month.into(),
        }
    }

    /// Returns the directory name for this bucket.
    ///
    /// ```
    /// use datefold::date_bucket::DateBucket;
    ///
    /// assert_eq!(DateBucket::year_month("2023", "05").dir_name(), "2023-05");
    /// ```
    pub fn dir_name(&self) -> String {
        match self {
            DateBucket::YearMonth { year, month } => format!("{}-{}", year, month),
            DateBucket::Unknown => UNKNOWN_DATE_DIR.to_string(),
        }
    }
}

impl fmt::Display for DateBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dir_name())
    }
}

/// How a bucket was chosen for a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateSource {
    /// A filename date rule matched.
    FileName,
    /// No rule matched; the file's modification time was used.
    ModifiedTime,
    /// The modification time could not be read. Holds the error text.
    Unavailable { reason: String },
}

/// The bucket chosen for a file together with where the date came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketAssignment {
    pub bucket: DateBucket,
    pub source: DateSource,
}

/// A filename rule: a pattern and the capture extractor that turns a match
/// into a bucket.
struct DateRule {
    regex: &'static LazyLock<Regex>,
    extract: fn(&Captures<'_>) -> Option<DateBucket>,
}

// YYYYMMDD_HHMMSS, as written by most phone cameras.
static LEADING_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})(\d{2})(\d{2})_").expect("valid date pattern"));

// IMG-YYYYMMDD-WA0001, as written by messaging apps.
static IMG_DASH_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"IMG-(\d{4})(\d{2})(\d{2})-").expect("valid date pattern"));

/// Filename rules in priority order. The first match wins.
static RULES: &[DateRule] = &[
    DateRule {
        regex: &LEADING_DATE,
        extract: year_month_from_groups,
    },
    DateRule {
        regex: &IMG_DASH_DATE,
        extract: year_month_from_groups,
    },
];

fn year_month_from_groups(caps: &Captures<'_>) -> Option<DateBucket> {
    let year = caps.get(1)?.as_str();
    let month = caps.get(2)?.as_str();
    Some(DateBucket::year_month(year, month))
}

/// Extracts a bucket from a filename using the built-in date rules.
///
/// Month and day values are not range-checked: `20231399_x.jpg` lands in
/// `2023-13`.
pub fn bucket_from_filename(file_name: &str) -> Option<DateBucket> {
    RULES.iter().find_map(|rule| {
        rule.regex
            .captures(file_name)
            .and_then(|caps| (rule.extract)(&caps))
    })
}

/// Formats a timestamp as a local-time year-month bucket.
///
/// Fails only when the timestamp is outside the range chrono can represent.
pub fn bucket_from_system_time(time: SystemTime) -> Result<DateBucket, String> {
    let seconds = match time.duration_since(UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_secs()).map_err(|e| e.to_string())?,
        Err(e) => {
            let before = e.duration();
            let whole = i64::try_from(before.as_secs()).map_err(|e| e.to_string())?;
            // Round towards negative infinity so 1969-12-31T23:59:59.5 stays in December.
            if before.subsec_nanos() > 0 {
                -whole - 1
            } else {
                -whole
            }
        }
    };

    let utc = DateTime::from_timestamp(seconds, 0)
        .ok_or_else(|| format!("timestamp {} is out of range", seconds))?;
    let local = utc.with_timezone(&Local);

    Ok(DateBucket::year_month(
        local.format("%Y").to_string(),
        local.format("%m").to_string(),
    ))
}

/// Turns the result of a modification-time lookup into an assignment.
///
/// Any failure routes the file to [`DateBucket::Unknown`], keeping the
/// error text for the progress line.
pub fn assign_from_modified(modified: std::io::Result<SystemTime>) -> BucketAssignment {
    match modified
        .map_err(|e| e.to_string())
        .and_then(bucket_from_system_time)
    {
        Ok(bucket) => BucketAssignment {
            bucket,
            source: DateSource::ModifiedTime,
        },
        Err(reason) => BucketAssignment {
            bucket: DateBucket::Unknown,
            source: DateSource::Unavailable { reason },
        },
    }
}

/// Chooses the bucket for a file.
///
/// Filename rules are tried first; the file is only touched on disk when
/// none of them match.
pub fn assign_bucket(file_name: &str, path: &Path) -> BucketAssignment {
    if let Some(bucket) = bucket_from_filename(file_name) {
        return BucketAssignment {
            bucket,
            source: DateSource::FileName,
        };
    }

    assign_from_modified(std::fs::metadata(path).and_then(|meta| meta.modified()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io;
    use std::time::Duration;

    fn local_time(year: i32, month: u32, day: u32) -> SystemTime {
        let dt = Local
            .with_ymd_and_hms(year, month, day, 12, 0, 0)
            .single()
            .expect("unambiguous local time");
        SystemTime::from(dt)
    }

    #[test]
    fn test_leading_date_pattern() {
        assert_eq!(
            bucket_from_filename("20240101_120000.png"),
            Some(DateBucket::year_month("2024", "01"))
        );
        assert_eq!(
            bucket_from_filename("19991231_foo.jpg"),
            Some(DateBucket::year_month("1999", "12"))
        );
    }

    #[test]
    fn test_leading_date_must_be_at_start() {
        // Only the IMG- rule may match anywhere in the name.
        assert_eq!(bucket_from_filename("x20240101_120000.png"), None);
    }

    #[test]
    fn test_img_dash_pattern_anywhere() {
        assert_eq!(
            bucket_from_filename("IMG-20230515-WA001.jpg"),
            Some(DateBucket::year_month("2023", "05"))
        );
        assert_eq!(
            bucket_from_filename("copy of IMG-20200229-WA0003.jpeg"),
            Some(DateBucket::year_month("2020", "02"))
        );
    }

    #[test]
    fn test_img_dash_pattern_is_case_sensitive() {
        assert_eq!(bucket_from_filename("img-20230515-wa001.jpg"), None);
    }

    #[test]
    fn test_first_rule_wins() {
        assert_eq!(
            bucket_from_filename("20110203_IMG-20230515-WA001.jpg"),
            Some(DateBucket::year_month("2011", "02"))
        );
    }

    #[test]
    fn test_no_range_validation() {
        assert_eq!(
            bucket_from_filename("20231399_000000.jpg"),
            Some(DateBucket::year_month("2023", "13"))
        );
    }

    #[test]
    fn test_no_match() {
        assert_eq!(bucket_from_filename("photo.jpg"), None);
        assert_eq!(bucket_from_filename("IMG_20230515_123456.jpg"), None);
        assert_eq!(bucket_from_filename("2024010_1.jpg"), None);
    }

    #[test]
    fn test_dir_names() {
        assert_eq!(DateBucket::year_month("2023", "05").dir_name(), "2023-05");
        assert_eq!(DateBucket::Unknown.dir_name(), "unknown_date");
        assert_eq!(DateBucket::Unknown.to_string(), "unknown_date");
    }

    #[test]
    fn test_system_time_formats_local_year_month() {
        let bucket = bucket_from_system_time(local_time(2022, 11, 3)).unwrap();
        assert_eq!(bucket, DateBucket::year_month("2022", "11"));
    }

    #[test]
    fn test_system_time_before_epoch() {
        let bucket = bucket_from_system_time(local_time(1965, 4, 20)).unwrap();
        assert_eq!(bucket, DateBucket::year_month("1965", "04"));
    }

    #[test]
    fn test_system_time_out_of_range() {
        let far_future = UNIX_EPOCH + Duration::from_secs(1 << 50);
        assert!(bucket_from_system_time(far_future).is_err());
    }

    #[test]
    fn test_modified_error_goes_to_unknown() {
        let assignment = assign_from_modified(Err(io::Error::other("stat failed")));
        assert_eq!(assignment.bucket, DateBucket::Unknown);
        assert_eq!(
            assignment.source,
            DateSource::Unavailable {
                reason: "stat failed".to_string()
            }
        );
    }

    #[test]
    fn test_assign_bucket_prefers_filename() {
        // The path does not exist, so a filename match must not touch the disk.
        let assignment = assign_bucket(
            "IMG-20230515-WA001.jpg",
            Path::new("/definitely/not/here/IMG-20230515-WA001.jpg"),
        );
        assert_eq!(assignment.bucket, DateBucket::year_month("2023", "05"));
        assert_eq!(assignment.source, DateSource::FileName);
    }

    #[test]
    fn test_assign_bucket_missing_file_is_unknown() {
        let assignment = assign_bucket("photo.jpg", Path::new("/definitely/not/here/photo.jpg"));
        assert_eq!(assignment.bucket, DateBucket::Unknown);
        assert!(matches!(assignment.source, DateSource::Unavailable { .. }));
    }

    #[test]
    fn test_unknown_sorts_after_year_month_keys() {
        let mut keys = vec![
            DateBucket::Unknown.dir_name(),
            DateBucket::year_month("2024", "01").dir_name(),
            DateBucket::year_month("2021", "07").dir_name(),
        ];
        keys.sort();
        assert_eq!(keys, vec!["2021-07", "2024-01", "unknown_date"]);
    }
}
