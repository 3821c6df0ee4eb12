//! The HTTP binding layer (§6, §10.2): thin `axum` handlers over the
//! component crates, assembled by [`router::build_router`] and driven by
//! the `enclii-api` binary.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod error;
pub mod router;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
