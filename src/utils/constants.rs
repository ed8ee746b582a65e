/// Directories
pub const RAW_DATA_DIR: &str = "./data/raw";
pub const OUTPUT_DIR: &str = "./data";

/// Pollutants processed by default
pub const POLLUTANTS: [&str; 7] = ["AQI", "PM2.5", "PM10", "SO2", "NO2", "CO", "O3"];

/// Raw file naming (china_cities_YYYYMMDD.csv)
pub const RAW_FILE_PREFIX: &str = "china_cities_";
pub const RAW_FILE_EXTENSION: &str = "csv";
pub const RAW_DATE_PATTERN: &str = r"(\d{8})";
pub const RAW_DATE_FORMAT: &str = "%Y%m%d";

/// Raw table columns that never hold city measurements
pub const METADATA_COLUMNS: [&str; 3] = ["date", "hour", "type"];
pub const POLLUTANT_COLUMN: &str = "type";

/// Output key columns and formats
pub const DATE_COLUMN: &str = "date";
pub const MONTH_COLUMN: &str = "month";
pub const YEAR_COLUMN: &str = "year";
pub const OUTPUT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Decimal places kept for rolled-up means
pub const MEAN_ROUNDING_DIGITS: i32 = 1;

/// Processing defaults
pub const DEFAULT_PROGRESS_INTERVAL: usize = 100;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "AQ";
