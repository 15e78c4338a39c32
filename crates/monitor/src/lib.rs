pub mod config;
pub mod error;
pub mod monitor;
pub mod request;

pub use config::MonitorConfig;
pub use error::MonitorError;
pub use monitor::{ExecutionMonitor, Outcome};
pub use request::{build_request_body, ExecutionRequest};
