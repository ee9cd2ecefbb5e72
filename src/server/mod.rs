//! Server module wiring parameter contracts into axum
//!
//! This module provides:
//! - `RouteContract`: the `allows`/`needs` declaration attached to a route
//! - `Params`/`OriginalParams`: extractors for the active and stashed parameters
//! - `ErrorMapper`: overridable error-to-response mapping
//! - `ServerBuilder`: assembles guarded routes into a router and serves it

pub mod builder;
pub mod contract;
pub mod error_mapper;
pub mod extract;

pub use builder::ServerBuilder;
pub use contract::{GuardContext, RouteContract};
pub use error_mapper::ErrorMapper;
pub use extract::{DEFAULT_BODY_LIMIT, OriginalParams, Params, collect_params};
