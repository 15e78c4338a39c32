pub mod http;
pub mod model;
pub mod traits;

pub use http::HttpExecutionApi;
pub use model::{ExecutionKind, ExecutionState, ExecutionStatus};
pub use traits::{ApiError, ExecutionApi};
