pub mod summary;
pub mod ui;
pub mod watch;

pub use watch::{ConsoleSink, RefreshLoop, SummarySink};
