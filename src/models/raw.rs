use chrono::NaiveDate;

use crate::models::Statistic;

/// One measurement row of a raw daily file
#[derive(Debug, Clone)]
pub struct RawRow {
    pub pollutant: String,
    pub values: Vec<Option<f64>>,
}

/// A full day's measurements across all pollutants and cities
#[derive(Debug, Clone)]
pub struct RawDailyRecord {
    pub date: NaiveDate,
    pub cities: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawDailyRecord {
    pub fn new(date: NaiveDate, cities: Vec<String>, rows: Vec<RawRow>) -> Self {
        Self { date, cities, rows }
    }

    pub fn has_pollutant(&self, pollutant: &str) -> bool {
        self.rows.iter().any(|r| r.pollutant == pollutant)
    }

    /// Reduce each city column over the rows of `pollutant`.
    ///
    /// Returns `None` when the day has no row for the pollutant at all, so the
    /// caller emits nothing for that day.
    pub fn reduce(&self, pollutant: &str, statistic: Statistic) -> Option<Vec<Option<f64>>> {
        let subset: Vec<&RawRow> = self.rows.iter().filter(|r| r.pollutant == pollutant).collect();
        if subset.is_empty() {
            return None;
        }

        let reduced = (0..self.cities.len())
            .map(|col| {
                statistic.reduce(
                    subset
                        .iter()
                        .filter_map(|row| row.values.get(col).copied().flatten()),
                )
            })
            .collect();

        Some(reduced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> RawDailyRecord {
        RawDailyRecord::new(
            NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            vec!["Beijing".to_string(), "Tianjin".to_string()],
            vec![
                RawRow {
                    pollutant: "AQI".to_string(),
                    values: vec![Some(50.0), None],
                },
                RawRow {
                    pollutant: "AQI".to_string(),
                    values: vec![Some(70.0), None],
                },
                RawRow {
                    pollutant: "PM10".to_string(),
                    values: vec![Some(5.0), Some(8.0)],
                },
            ],
        )
    }

    #[test]
    fn test_reduce_pollutant_subset() {
        let record = sample_record();

        assert_eq!(
            record.reduce("AQI", Statistic::Mean),
            Some(vec![Some(60.0), None])
        );
        assert_eq!(
            record.reduce("AQI", Statistic::Max),
            Some(vec![Some(70.0), None])
        );
        assert_eq!(
            record.reduce("PM10", Statistic::Min),
            Some(vec![Some(5.0), Some(8.0)])
        );
    }

    #[test]
    fn test_absent_pollutant_yields_nothing() {
        let record = sample_record();

        assert!(!record.has_pollutant("O3"));
        assert_eq!(record.reduce("O3", Statistic::Mean), None);
    }
}
