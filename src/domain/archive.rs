//! Year/month archive of published entries and its formatting helpers.

use serde::Serialize;
use time::{Date, format_description::FormatItem, macros::format_description};

pub const YEAR_KEY_FORMAT: &[FormatItem<'static>] = format_description!("[year]");
pub const MONTH_KEY_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month padding:zero]");
pub const MONTH_LABEL_FORMAT: &[FormatItem<'static>] =
    format_description!("[month repr:long] [year]");
pub const MONTH_NAME_FORMAT: &[FormatItem<'static>] = format_description!("[month repr:long]");
pub const HUMAN_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[month repr:long] [day padding:none], [year]");

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveMonth {
    /// First day of the month.
    pub month: Date,
    pub post_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveYear {
    /// January 1st of the year.
    pub year: Date,
    pub months: Vec<ArchiveMonth>,
}

impl ArchiveYear {
    pub fn post_count(&self) -> u64 {
        self.months.iter().map(|month| month.post_count).sum()
    }
}

/// Years in store order, each with its months in store order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MonthLinks {
    pub years: Vec<ArchiveYear>,
}

impl MonthLinks {
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn post_count(&self) -> u64 {
        self.years.iter().map(ArchiveYear::post_count).sum()
    }
}

pub fn year_key_for(date: Date) -> String {
    date.format(YEAR_KEY_FORMAT).expect("valid year key")
}

pub fn month_key_for(date: Date) -> String {
    date.format(MONTH_KEY_FORMAT).expect("valid month key")
}

pub fn month_label_for(date: Date) -> String {
    date.format(MONTH_LABEL_FORMAT).expect("valid month label")
}

pub fn month_name_for(date: Date) -> String {
    date.format(MONTH_NAME_FORMAT).expect("valid month name")
}

pub fn format_human_date(date: Date) -> String {
    date.format(HUMAN_DATE_FORMAT).expect("valid calendar date")
}
