pub mod icons;
pub mod output;
pub mod progress;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{header, section, status, success, summary_row, timing, warn};
pub use progress::ImportProgress;
pub use table::{failures_table, stats_table, TableBuilder};
pub use theme::{theme, Theme};
