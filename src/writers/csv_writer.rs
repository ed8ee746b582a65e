use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::StatisticTable;
use crate::utils::format::format_value;

/// Writes statistic tables as UTF-8 CSV with a header row.
///
/// Output goes to a sibling temporary file that is renamed over the target,
/// so readers never observe a partially written table.
/// Missing parent directories are created.
pub struct TableWriter;

impl TableWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn write_table(&self, table: &StatisticTable, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let staging = staging_path(path);
        {
            let mut writer = csv::Writer::from_path(&staging)?;

            let mut header = Vec::with_capacity(table.cities().len() + 1);
            header.push(table.granularity().key_column().to_string());
            header.extend(table.cities().iter().cloned());
            writer.write_record(&header)?;

            let width = table.cities().len();
            for row in table.rows() {
                let mut record = Vec::with_capacity(width + 1);
                record.push(row.key.clone());
                record.extend((0..width).map(|i| format_value(row.value(i))));
                writer.write_record(&record)?;
            }

            writer.flush()?;
        }

        fs::rename(&staging, path)?;
        Ok(())
    }
}

impl Default for TableWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Granularity, StatisticRow};
    use crate::readers::TableReader;
    use tempfile::TempDir;

    fn sample_table() -> StatisticTable {
        let mut table = StatisticTable::with_cities(
            Granularity::Month,
            vec!["Beijing".to_string(), "Shanghai".to_string()],
        );
        table.push_row(StatisticRow::new(
            "2021-01".to_string(),
            vec![Some(15.0), None],
        ));
        table.push_row(StatisticRow::new(
            "2021-02".to_string(),
            vec![Some(12.25), Some(3.5)],
        ));
        table
    }

    #[test]
    fn test_write_table_layout() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("nested").join("AQI_monthmean.csv");

        TableWriter::new().write_table(&sample_table(), &path)?;

        let contents = fs::read_to_string(&path)?;
        assert_eq!(
            contents,
            "month,Beijing,Shanghai\n2021-01,15.0,\n2021-02,12.25,3.5\n"
        );
        assert!(!staging_path(&path).exists());
        Ok(())
    }

    #[test]
    fn test_overwrites_existing_table() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("AQI_monthmean.csv");
        fs::write(&path, "stale contents\n")?;

        TableWriter::new().write_table(&sample_table(), &path)?;

        let table = TableReader::new().read_table(&path)?;
        assert_eq!(table.len(), 2);
        assert_eq!(table.value("2021-02", "Shanghai"), Some(3.5));
        Ok(())
    }
}
