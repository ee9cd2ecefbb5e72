//! Small demo server showing `allows` and `needs` on a couple of routes
//!
//! ```text
//! cargo run --bin params_demo
//! curl 'localhost:3000/items?id=7&action=show&extra=x'
//! curl 'localhost:3000/items?action=show'
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use route_params::prelude::*;
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

async fn show_item(Params(params): Params, OriginalParams(original): OriginalParams) -> Json<Value> {
    Json(json!({
        "params": params.to_json(),
        "received": original.len(),
    }))
}

async fn create_session(Params(params): Params) -> Json<Value> {
    Json(json!({
        "user": params.fetch("user"),
        "redirect_to": params.fetch("redirect_to"),
    }))
}

async fn search(Params(params): Params) -> Json<Value> {
    Json(params.to_json())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("route_params=debug,tower_http=info")),
        )
        .init();

    let config = ParamsConfig::new().with_global_allows(["csrf_token", "redirect_to"]);

    let errors = ErrorMapper::new().on_missing_parameter(|err| {
        let body = Json(json!({
            "error": err.message(),
            "field": err.field().map(|f| f.to_string()),
        }));
        (StatusCode::BAD_REQUEST, body).into_response()
    });

    ServerBuilder::new()
        .with_config(config)
        .with_error_mapper(errors)
        .route(
            "/items",
            get(show_item),
            RouteContract::new().allows(["id", "action"]).needs(["id"]),
        )
        .route(
            "/sessions",
            post(create_session),
            RouteContract::new().allows(["user", "password"]).needs(["user", "password"]),
        )
        .route("/search", get(search), RouteContract::new())
        .serve("127.0.0.1:3000")
        .await
}
