pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{CliArgs, ReportFormatArg};
pub use handlers::{handle_check, EXIT_FAILURE, EXIT_INTERRUPTED, EXIT_SUCCESS};
pub use output::format_summary;
