use chrono::{DateTime, Datelike, TimeZone, Utc};
use chrono_tz::Tz;
use time::{Date, Month, OffsetDateTime, UtcOffset};

pub fn localized_datetime(time: OffsetDateTime, tz: Tz) -> DateTime<Tz> {
    let utc = time.to_offset(UtcOffset::UTC);
    let datetime_utc = DateTime::<Utc>::from_timestamp(utc.unix_timestamp(), utc.nanosecond())
        .or_else(|| DateTime::<Utc>::from_timestamp(utc.unix_timestamp(), 0))
        .unwrap_or_default();
    tz.from_utc_datetime(&datetime_utc.naive_utc())
}

/// Calendar date of `time` as seen on a wall clock in `tz`.
pub fn localized_date(time: OffsetDateTime, tz: Tz) -> Date {
    let localized = localized_datetime(time, tz);
    let fallback = time.to_offset(UtcOffset::UTC).date();
    let Ok(month) = Month::try_from(localized.month() as u8) else {
        return fallback;
    };
    Date::from_calendar_date(localized.year(), month, localized.day() as u8).unwrap_or(fallback)
}

/// First day of the year containing `time` in `tz`.
pub fn year_bucket(time: OffsetDateTime, tz: Tz) -> Date {
    let date = localized_date(time, tz);
    Date::from_ordinal_date(date.year(), 1).unwrap_or(date)
}

/// First day of the month containing `time` in `tz`.
pub fn month_bucket(time: OffsetDateTime, tz: Tz) -> Date {
    let date = localized_date(time, tz);
    date.replace_day(1).unwrap_or(date)
}
