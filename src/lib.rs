//! # route-params
//!
//! Declarative parameter contracts for axum routes.
//!
//! ## Features
//!
//! - **`allows`**: filter request parameters down to a declared allow-list
//!   (plus a process-wide global allow-list)
//! - **`needs`**: reject a request before its handler runs when a required
//!   parameter is missing or blank
//! - **Default-value policies**: filtered parameter sets keep their fallback lookup
//! - **Stash**: the unfiltered parameters stay available as `OriginalParams`
//! - **Overridable errors**: map a missing parameter to any response you like
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use route_params::prelude::*;
//!
//! async fn show(Params(params): Params) -> String {
//!     format!("showing {}", params.fetch("id").unwrap_or_default())
//! }
//!
//! let app = ServerBuilder::new()
//!     .with_config(ParamsConfig::new().with_global_allows(["csrf_token"]))
//!     .route(
//!         "/items",
//!         get(show),
//!         RouteContract::new().allows(["id", "action"]).needs(["id"]),
//!     )
//!     .build()?;
//!
//! // GET /items?id=7&extra=x  -> handler sees {id: "7"}
//! // GET /items?action=show   -> 400 "Id cannot be blank"
//! ```

pub mod config;
pub mod core;
pub mod server;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        error::{ErrorKind, MissingParameterError, ParamsError},
        field::{FieldName, humanize, normalize},
        guard::{AllowGuard, Guard, GuardOutcome, RequireGuard},
        params::{DefaultPolicy, ParameterSet},
    };

    // === Config ===
    pub use crate::config::{DEFAULT_MISSING_PARAMETER_MESSAGE, ParamsConfig};

    // === Server ===
    pub use crate::server::{
        ErrorMapper, GuardContext, OriginalParams, Params, RouteContract, ServerBuilder,
    };

    // === External dependencies ===
    pub use anyhow::Result;

    // === Axum ===
    pub use axum::{
        Router,
        routing::{delete, get, post, put},
    };
}
