use std::collections::HashMap;

use crate::models::Granularity;

/// One row of a statistic table: the period key followed by one value per city
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticRow {
    pub key: String,
    pub values: Vec<Option<f64>>,
}

impl StatisticRow {
    pub fn new(key: String, values: Vec<Option<f64>>) -> Self {
        Self { key, values }
    }

    /// Value of the city at `index`; rows appended before a city was first
    /// seen have no cell for it.
    pub fn value(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }
}

/// A (pollutant, statistic, granularity) table held in memory.
///
/// City columns are kept in first-seen order. Appending a row that carries a
/// city the table has not seen before extends the column set.
#[derive(Debug, Clone)]
pub struct StatisticTable {
    granularity: Granularity,
    cities: Vec<String>,
    city_index: HashMap<String, usize>,
    rows: Vec<StatisticRow>,
}

impl StatisticTable {
    pub fn new(granularity: Granularity) -> Self {
        Self {
            granularity,
            cities: Vec::new(),
            city_index: HashMap::new(),
            rows: Vec::new(),
        }
    }

    pub fn with_cities(granularity: Granularity, cities: Vec<String>) -> Self {
        let mut table = Self::new(granularity);
        for city in cities {
            table.register_city(&city);
        }
        table
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn cities(&self) -> &[String] {
        &self.cities
    }

    pub fn rows(&self) -> &[StatisticRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn city_position(&self, city: &str) -> Option<usize> {
        self.city_index.get(city).copied()
    }

    pub fn row(&self, key: &str) -> Option<&StatisticRow> {
        self.rows.iter().find(|r| r.key == key)
    }

    /// Value for `city` in the row keyed `key`
    pub fn value(&self, key: &str, city: &str) -> Option<f64> {
        let index = self.city_position(city)?;
        self.row(key)?.value(index)
    }

    /// Append a row whose values already follow this table's column order
    pub fn push_row(&mut self, row: StatisticRow) {
        self.rows.push(row);
    }

    /// Append a row whose values follow `cities`, mapping them onto this
    /// table's columns and registering any city not seen before.
    pub fn append(&mut self, key: String, cities: &[String], values: &[Option<f64>]) {
        let positions: Vec<usize> = cities.iter().map(|c| self.register_city(c)).collect();

        let mut aligned = vec![None; self.cities.len()];
        for (position, value) in positions.into_iter().zip(values.iter()) {
            aligned[position] = *value;
        }

        self.rows.push(StatisticRow::new(key, aligned));
    }

    /// Count of cells with no value, including cells padded for late cities
    pub fn missing_cells(&self) -> usize {
        let width = self.cities.len();
        self.rows
            .iter()
            .map(|row| (0..width).filter(|&i| row.value(i).is_none()).count())
            .sum()
    }

    fn register_city(&mut self, city: &str) -> usize {
        if let Some(&index) = self.city_index.get(city) {
            return index;
        }
        let index = self.cities.len();
        self.cities.push(city.to_string());
        self.city_index.insert(city.to_string(), index);
        index
    }
}
