pub mod aggregation;
pub mod api_commands;
pub mod models;

pub use aggregation::{
    summarize, verify_summary, MonthlyOverview, PortfolioStats, SummaryCheck, TotalSource,
};
pub use models::{ReportSummary, UNCATEGORIZED_LABEL};
