pub mod charts;
pub mod dashboard;
pub mod filter;
pub mod format;
pub mod status;

pub use dashboard::render_dashboard;
pub use status::{render_help_bar, render_title_bar};
