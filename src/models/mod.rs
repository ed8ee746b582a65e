pub mod granularity;
pub mod raw;
pub mod statistic;
pub mod table;

pub use granularity::Granularity;
pub use raw::{RawDailyRecord, RawRow};
pub use statistic::Statistic;
pub use table::{StatisticRow, StatisticTable};
