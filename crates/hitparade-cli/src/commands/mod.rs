pub mod analyze;
pub mod chart;
pub mod config;
pub mod export;
pub mod features;
pub mod lyrics;
pub mod status;

pub use analyze::run_analyze;
pub use chart::run_chart;
pub use export::run_export;
pub use features::run_features;
pub use lyrics::run_lyrics;
pub use status::show_status;
