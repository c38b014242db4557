//! HTTP request handlers.

pub mod health;
pub mod metrics;
pub mod session_handler;
pub mod token_handler;

pub use health::health_check;
pub use metrics::metrics_handler;
pub use session_handler::get_session;
pub use token_handler::issue_token;
