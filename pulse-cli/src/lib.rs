pub mod logging;
pub mod run;

pub use logging::{LogConfig, LogFormat, init_logging};
pub use run::{Pacing, RunOptions, RunReport, run_demo};
