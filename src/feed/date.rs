use std::fmt;

use chrono::{DateTime, FixedOffset, Offset, Utc};

use crate::xml::RenderError;

/// `D, d M Y H:i:s O`, the date shape RSS 2.0 mandates.
const RFC822_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Converts unix-epoch seconds into the string written for `pubDate` and
/// `lastBuildDate`.
///
/// Returns `None` when the timestamp cannot be represented; rendering then
/// fails with [`RenderError::TimestampOutOfRange`].
pub trait DateFormatter: fmt::Debug + Send + Sync {
    fn format(&self, timestamp: i64) -> Option<String>;
}

/// RFC-822 formatter in a fixed UTC offset (UTC by default).
///
/// # Examples
///
/// ```
/// use rss_writer::feed::{DateFormatter, Rfc822};
///
/// let tokyo = Rfc822::from_offset_seconds(9 * 3600).unwrap();
/// assert_eq!(
///     tokyo.format(1345546237).as_deref(),
///     Some("Tue, 21 Aug 2012 19:50:37 +0900")
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rfc822 {
    offset: FixedOffset,
}

impl Rfc822 {
    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    pub fn with_offset(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// East of UTC is positive. `None` if the offset is a day or more.
    pub fn from_offset_seconds(seconds: i32) -> Option<Self> {
        FixedOffset::east_opt(seconds).map(Self::with_offset)
    }
}

impl Default for Rfc822 {
    fn default() -> Self {
        Self::utc()
    }
}

impl DateFormatter for Rfc822 {
    fn format(&self, timestamp: i64) -> Option<String> {
        let utc = DateTime::<Utc>::from_timestamp(timestamp, 0)?;
        Some(utc.with_timezone(&self.offset).format(RFC822_FORMAT).to_string())
    }
}

pub(crate) fn format_timestamp(
    dates: &dyn DateFormatter,
    timestamp: i64,
) -> Result<String, RenderError> {
    dates
        .format(timestamp)
        .ok_or(RenderError::TimestampOutOfRange(timestamp))
}
