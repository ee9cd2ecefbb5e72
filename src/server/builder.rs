//! ServerBuilder for fluent API to build HTTP servers with guarded routes

use super::contract::{GuardContext, RouteContract};
use super::error_mapper::ErrorMapper;
use super::extract::DEFAULT_BODY_LIMIT;
use crate::config::ParamsConfig;
use crate::core::params::DefaultPolicy;
use anyhow::Result;
use axum::Router;
use axum::routing::MethodRouter;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Builder for creating HTTP servers whose routes carry parameter contracts
///
/// The configuration and error mapper are frozen when [`build`](Self::build)
/// is called and shared read-only by every request afterwards.
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_config(ParamsConfig::new().with_global_allows(["csrf_token"]))
///     .route("/items", get(show_item), RouteContract::new().allows(["id"]).needs(["id"]))
///     .build()?;
/// ```
pub struct ServerBuilder {
    config: ParamsConfig,
    errors: ErrorMapper,
    body_limit: usize,
    default_policy: Option<DefaultPolicy>,
    routes: Vec<(String, MethodRouter, RouteContract)>,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        Self {
            config: ParamsConfig::default(),
            errors: ErrorMapper::default(),
            body_limit: DEFAULT_BODY_LIMIT,
            default_policy: None,
            routes: Vec::new(),
            custom_routes: Vec::new(),
        }
    }

    /// Set the process-wide parameter configuration
    pub fn with_config(mut self, config: ParamsConfig) -> Self {
        self.config = config;
        self
    }

    /// Load and merge parameter configuration from a YAML file
    ///
    /// Allow-lists are unioned with the configuration set so far.
    pub fn with_config_file(mut self, path: &str) -> Result<Self> {
        let loaded = ParamsConfig::from_yaml_file(path)?;
        self.config = ParamsConfig::merge(vec![self.config, loaded]);
        Ok(self)
    }

    /// Set the error mapper used for rejected requests
    pub fn with_error_mapper(mut self, errors: ErrorMapper) -> Self {
        self.errors = errors;
        self
    }

    /// Maximum number of body bytes buffered while collecting parameters
    pub fn with_body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    /// Default-value policy attached to every request's parameters
    ///
    /// Handlers see it through [`ParameterSet::fetch`](crate::core::params::ParameterSet::fetch)
    /// for keys the request did not carry, including keys removed by `allows`.
    pub fn with_default_policy(mut self, policy: DefaultPolicy) -> Self {
        self.default_policy = Some(policy);
        self
    }

    /// Register a route with its parameter contract
    ///
    /// Pass `RouteContract::new()` for a route without `allows`/`needs`.
    /// Registering two method routers for the same method on the same path
    /// panics when the router is built, as with axum.
    pub fn route(
        mut self,
        path: impl Into<String>,
        method_router: MethodRouter,
        contract: RouteContract,
    ) -> Self {
        self.routes.push((path.into(), method_router, contract));
        self
    }

    /// Add routes that are not subject to any contract
    ///
    /// `Params` on these routes only sees the query string.
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Shared guard state built from the current configuration
    pub fn guard_context(&self) -> GuardContext {
        let context = GuardContext::new(self.config.clone(), self.errors.clone())
            .with_body_limit(self.body_limit);
        match &self.default_policy {
            Some(policy) => context.with_default_policy(policy.clone()),
            None => context,
        }
    }

    /// Build the final router
    pub fn build(self) -> Result<Router> {
        let context = self.guard_context();
        tracing::debug!(
            routes = self.routes.len(),
            global_allows = context.config.globally_allowed_parameters.len(),
            "building guarded router"
        );

        let mut router = Router::new();
        for (path, method_router, contract) in self.routes {
            router = router.route(&path, contract.apply(method_router, context.clone()));
        }

        for custom in self.custom_routes {
            router = router.merge(custom);
        }

        Ok(router.layer(TraceLayer::new_for_http()))
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to the provided address
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
