//! Primitive aliases shared by every crate.

/// Primary keys (`BIGSERIAL`).
pub type DbId = i64;

/// UTC instant (`TIMESTAMPTZ`).
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Calendar date without time zone (`DATE`), e.g. the inspection date.
pub type CalendarDate = chrono::NaiveDate;
