pub mod daily_aggregator;
pub mod pipeline;
pub mod report;
pub mod rollup_aggregator;

pub use daily_aggregator::{DailyAggregator, DailyTables};
pub use pipeline::{Pipeline, PipelineReport};
pub use report::{DailyReport, RollupReport, SkippedInput};
pub use rollup_aggregator::{roll_up, RollupAggregator};
