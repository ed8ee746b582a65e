use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::Statistic;
use crate::utils::constants::{DATE_COLUMN, MONTH_COLUMN, OUTPUT_DATE_FORMAT, YEAR_COLUMN};

/// Time bucket of an output table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Month,
    Year,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Day => "day",
            Granularity::Month => "month",
            Granularity::Year => "year",
        }
    }

    /// Name of the first column of a table at this granularity
    pub fn key_column(&self) -> &'static str {
        match self {
            Granularity::Day => DATE_COLUMN,
            Granularity::Month => MONTH_COLUMN,
            Granularity::Year => YEAR_COLUMN,
        }
    }

    pub fn from_key_column(column: &str) -> Option<Self> {
        match column.trim() {
            DATE_COLUMN => Some(Granularity::Day),
            MONTH_COLUMN => Some(Granularity::Month),
            YEAR_COLUMN => Some(Granularity::Year),
            _ => None,
        }
    }

    /// Period key of `date`: `2021-01-05`, `2021-01` or `2021`.
    ///
    /// Keys of one granularity sort lexically in chronological order.
    pub fn period_key(&self, date: NaiveDate) -> String {
        match self {
            Granularity::Day => date.format(OUTPUT_DATE_FORMAT).to_string(),
            Granularity::Month => format!("{:04}-{:02}", date.year(), date.month()),
            Granularity::Year => format!("{:04}", date.year()),
        }
    }

    /// File name of the (pollutant, statistic) table, e.g. `PM2.5_monthmax.csv`
    pub fn table_file_name(&self, pollutant: &str, statistic: Statistic) -> String {
        format!("{}_{}{}.csv", pollutant, self.as_str(), statistic.as_str())
    }

    /// Inverse of [`Granularity::table_file_name`]
    pub fn parse_table_file_name(file_name: &str) -> Option<(String, Granularity, Statistic)> {
        let stem = file_name.strip_suffix(".csv")?;
        let (pollutant, suffix) = stem.rsplit_once('_')?;

        for granularity in [Granularity::Day, Granularity::Month, Granularity::Year] {
            if let Some(stat) = suffix.strip_prefix(granularity.as_str()) {
                if let Ok(statistic) = stat.parse::<Statistic>() {
                    return Some((pollutant.to_string(), granularity, statistic));
                }
            }
        }

        None
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
