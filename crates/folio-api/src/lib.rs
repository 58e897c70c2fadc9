pub mod context;
pub mod error;
pub mod llm;
pub mod notify;
pub mod oauth;
pub mod procedures;
pub mod routes;
pub mod rpc;
pub mod session;
pub mod state;

pub use error::ApiError;
pub use routes::router;
pub use state::{AppState, AppStateInner, Settings};
