mod error;
pub mod models;
mod server;
pub mod services;
pub mod state;

pub use error::ApiError;
pub use server::{build_router, build_state, run};
pub use state::AppState;
