//! jsondiff server - HTTP surface of the saved-diff service
//!
//! Three routes: `/` and `/<model_id>` render the viewer page, `/_save`
//! stores a comparison state and answers with its id.

pub mod config;
pub mod request_id;
pub mod routes;
pub mod state;

pub use config::{DatabaseTarget, ServerConfig};
pub use routes::router;
pub use state::AppState;
