mod chart;
mod export;

pub use chart::{render_chart, BAR_WIDTH};
pub use export::{write_csv, ExportError};
