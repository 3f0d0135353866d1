//! Progress reporting for detection and collection

mod handler;
mod logging;
mod spinner;

pub use handler::{NoOpHandler, ProgressEvent, ProgressHandler};
pub use logging::LoggingHandler;
pub use spinner::SpinnerHandler;
