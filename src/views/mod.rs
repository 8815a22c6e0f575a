//! View models: record lists, the pipeline board, dashboard metrics and the
//! activity feed.

pub mod activity;
pub mod dashboard;
pub mod list;
pub mod names;
pub mod pipeline;

pub use activity::{ActivityFeed, FeedEntry};
pub use dashboard::DashboardMetrics;
pub use list::{Confirm, Listed, LoadState, RecordList, filter};
pub use names::{NameIndex, UNKNOWN_CONTACT};
pub use pipeline::{PipelineBoard, StageColumn};
