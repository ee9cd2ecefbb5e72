//! Per-route parameter contracts
//!
//! A [`RouteContract`] is the route-declaration surface: `allows` installs an
//! [`AllowGuard`], `needs` installs a [`RequireGuard`]. When both are declared
//! the allow-filter runs first and the requirement is checked against the
//! filtered set. Application guards added with [`RouteContract::guard`] run
//! after them; one returning [`GuardOutcome::NoMatch`] rejects the request as
//! [`ParamsError::RouteNotMatched`].
//!
//! Contracts are attached to axum routes as middleware. For each request the
//! middleware collects the parameters, stashes an unfiltered copy as
//! [`OriginalParams`], runs the guards and hands the active set to the handler
//! as [`Params`]. Failures go through the shared [`ErrorMapper`].

use super::error_mapper::ErrorMapper;
use super::extract::{DEFAULT_BODY_LIMIT, OriginalParams, Params, collect_params};
use crate::config::ParamsConfig;
use crate::core::error::{MissingParameterError, ParamsError};
use crate::core::field::FieldName;
use crate::core::guard::{AllowGuard, Guard, GuardOutcome, RequireGuard};
use crate::core::params::{DefaultPolicy, ParameterSet};
use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::MethodRouter;
use std::sync::Arc;

/// Parameter contract declared on a single route
///
/// ```rust,ignore
/// let contract = RouteContract::new()
///     .allows(["id", "action"])
///     .needs(["id"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RouteContract {
    allows: Option<AllowGuard>,
    needs: Option<RequireGuard>,
    custom: Vec<Arc<dyn Guard>>,
}

impl RouteContract {
    pub fn new() -> Self {
        Self::default()
    }

    /// Permit only these fields (plus the global allow-list)
    pub fn allows<I, K>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<FieldName>,
    {
        self.allows = Some(AllowGuard::new(fields));
        self
    }

    /// Require these fields to be present and non-blank
    pub fn needs<I, K>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<FieldName>,
    {
        self.needs = Some(RequireGuard::new(fields));
        self
    }

    /// Add an application guard, evaluated after `allows` and `needs`
    ///
    /// ```rust,ignore
    /// #[derive(Debug)]
    /// struct JsonOnly;
    ///
    /// impl Guard for JsonOnly {
    ///     fn name(&self) -> &'static str {
    ///         "json_only"
    ///     }
    ///
    ///     fn evaluate(
    ///         &self,
    ///         params: &mut ParameterSet,
    ///         _config: &ParamsConfig,
    ///     ) -> Result<GuardOutcome, MissingParameterError> {
    ///         Ok(GuardOutcome::from(params.get("format") == Some("json")))
    ///     }
    /// }
    ///
    /// let contract = RouteContract::new().needs(["id"]).guard(JsonOnly);
    /// ```
    pub fn guard<G>(mut self, guard: G) -> Self
    where
        G: Guard + 'static,
    {
        self.custom.push(Arc::new(guard));
        self
    }

    pub fn allow_guard(&self) -> Option<&AllowGuard> {
        self.allows.as_ref()
    }

    pub fn require_guard(&self) -> Option<&RequireGuard> {
        self.needs.as_ref()
    }

    /// True when no guard was declared
    pub fn is_empty(&self) -> bool {
        self.allows.is_none() && self.needs.is_none() && self.custom.is_empty()
    }

    /// Declared guards in evaluation order
    pub fn guards(&self) -> Vec<&dyn Guard> {
        let mut guards: Vec<&dyn Guard> = Vec::with_capacity(2 + self.custom.len());
        if let Some(allows) = &self.allows {
            guards.push(allows);
        }
        if let Some(needs) = &self.needs {
            guards.push(needs);
        }
        guards.extend(self.custom.iter().map(|g| g.as_ref()));
        guards
    }

    /// Run the declared guards against `params`
    ///
    /// Stops at the first guard that does not pass.
    pub fn evaluate(
        &self,
        params: &mut ParameterSet,
        config: &ParamsConfig,
    ) -> Result<GuardOutcome, MissingParameterError> {
        for guard in self.guards() {
            let outcome = guard.evaluate(params, config)?;
            if !outcome.is_pass() {
                tracing::debug!(guard = guard.name(), "route does not match");
                return Ok(outcome);
            }
        }
        Ok(GuardOutcome::Pass)
    }

    /// Attach this contract to a method router
    ///
    /// The middleware is installed even for an empty contract, so `Params`
    /// carries the same query and body fields on every registered route.
    pub fn apply<S>(self, route: MethodRouter<S>, context: GuardContext) -> MethodRouter<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let state = ContractState {
            contract: Arc::new(self),
            context,
        };
        route.layer(middleware::from_fn_with_state(state, enforce_contract))
    }
}

/// Process-wide state shared by every contract middleware
///
/// Built once by the [`ServerBuilder`](super::ServerBuilder); never mutated
/// afterwards.
#[derive(Debug, Clone)]
pub struct GuardContext {
    pub config: Arc<ParamsConfig>,
    pub errors: Arc<ErrorMapper>,
    pub body_limit: usize,
    /// Attached to every collected set before the guards run
    pub default_policy: Option<DefaultPolicy>,
}

impl GuardContext {
    pub fn new(config: ParamsConfig, errors: ErrorMapper) -> Self {
        Self {
            config: Arc::new(config),
            errors: Arc::new(errors),
            body_limit: DEFAULT_BODY_LIMIT,
            default_policy: None,
        }
    }

    pub fn with_body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    pub fn with_default_policy(mut self, policy: DefaultPolicy) -> Self {
        self.default_policy = Some(policy);
        self
    }
}

impl Default for GuardContext {
    fn default() -> Self {
        Self::new(ParamsConfig::default(), ErrorMapper::default())
    }
}

#[derive(Debug, Clone)]
struct ContractState {
    contract: Arc<RouteContract>,
    context: GuardContext,
}

impl ContractState {
    async fn prepare(&self, req: Request) -> Result<Request, ParamsError> {
        let (mut req, mut original) = collect_params(req, self.context.body_limit).await?;
        original.set_default_policy(self.context.default_policy.clone());

        let mut active = original.clone();
        req.extensions_mut().insert(OriginalParams(original));

        match self.contract.evaluate(&mut active, &self.context.config)? {
            GuardOutcome::Pass => {
                req.extensions_mut().insert(Params(active));
                Ok(req)
            }
            GuardOutcome::NoMatch => Err(ParamsError::RouteNotMatched),
        }
    }
}

async fn enforce_contract(
    State(state): State<ContractState>,
    req: Request,
    next: Next,
) -> Response {
    match state.prepare(req).await {
        Ok(req) => next.run(req).await,
        Err(err) => state.context.errors.map(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::StatusCode;
    use axum::routing::get;
    use tower::ServiceExt;

    #[derive(Debug)]
    struct FormatGuard(&'static str);

    impl Guard for FormatGuard {
        fn name(&self) -> &'static str {
            "format"
        }

        fn evaluate(
            &self,
            params: &mut ParameterSet,
            _config: &ParamsConfig,
        ) -> Result<GuardOutcome, MissingParameterError> {
            Ok(GuardOutcome::from(params.get("format") == Some(self.0)))
        }
    }

    async fn send(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    async fn echo(params: Params) -> String {
        params
            .keys()
            .map(|k| k.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }

    #[test]
    fn test_empty_contract_passes_everything_through() {
        let contract = RouteContract::new();
        let mut params = ParameterSet::from_pairs([("anything", "goes")]);
        let before = params.clone();

        let outcome = contract
            .evaluate(&mut params, &ParamsConfig::default())
            .unwrap();

        assert!(contract.is_empty());
        assert!(outcome.is_pass());
        assert_eq!(params, before);
    }

    #[test]
    fn test_allows_runs_before_needs() {
        let contract = RouteContract::new()
            .needs(["id", "extra"])
            .allows(["id"]);
        let mut params = ParameterSet::from_pairs([("id", "7"), ("extra", "x")]);

        let err = contract
            .evaluate(&mut params, &ParamsConfig::default())
            .unwrap_err();

        assert_eq!(err.message(), "Extra cannot be blank");
        assert!(!params.contains_key("extra"));
    }

    #[test]
    fn test_guard_order() {
        let contract = RouteContract::new().needs(["id"]).allows(["id"]);
        let names: Vec<&str> = contract.guards().iter().map(|g| g.name()).collect();
        assert_eq!(names, vec!["allows", "needs"]);
    }

    #[test]
    fn test_custom_guards_run_last() {
        let contract = RouteContract::new()
            .guard(FormatGuard("json"))
            .needs(["id"])
            .allows(["id", "format"]);
        let names: Vec<&str> = contract.guards().iter().map(|g| g.name()).collect();

        assert!(!contract.is_empty());
        assert_eq!(names, vec!["allows", "needs", "format"]);
    }

    #[test]
    fn test_custom_guard_no_match_stops_evaluation() {
        let contract = RouteContract::new().guard(FormatGuard("json")).needs(["id"]);
        let mut params = ParameterSet::from_pairs([("id", "7"), ("format", "xml")]);

        let outcome = contract
            .evaluate(&mut params, &ParamsConfig::default())
            .unwrap();

        assert_eq!(outcome, GuardOutcome::NoMatch);
    }

    #[test]
    fn test_global_allow_list_feeds_needs() {
        let config = ParamsConfig::new().with_global_allows(["csrf_token"]);
        let contract = RouteContract::new().allows(["id"]).needs(["csrf_token"]);
        let mut params = ParameterSet::from_pairs([("id", "7"), ("csrf_token", "abc")]);

        assert!(contract.evaluate(&mut params, &config).unwrap().is_pass());
        assert_eq!(params.len(), 2);
    }

    #[tokio::test]
    async fn test_applied_contract_filters_before_handler() {
        let contract = RouteContract::new().allows(["id"]);
        let app = Router::new().route(
            "/items",
            contract.apply(get(echo), GuardContext::default()),
        );

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/items?id=7&extra=x")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"id");
    }

    #[tokio::test]
    async fn test_applied_contract_rejects_through_mapper() {
        let contract = RouteContract::new().needs(["id"]);
        let app = Router::new().route(
            "/items",
            contract.apply(get(echo), GuardContext::default()),
        );

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/items?other=1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Id cannot be blank");
    }

    #[tokio::test]
    async fn test_custom_guard_no_match_is_404() {
        let contract = RouteContract::new().guard(FormatGuard("json"));
        let app = Router::new().route(
            "/items",
            contract.apply(get(echo), GuardContext::default()),
        );

        let (status, _) = send(app.clone(), "/items?format=xml").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(app, "/items?format=json").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "format");
    }

    #[tokio::test]
    async fn test_default_policy_reaches_handler() {
        async fn page(params: Params) -> String {
            params.fetch("page").unwrap_or_default()
        }

        let context = GuardContext::default().with_default_policy(DefaultPolicy::value("1"));
        let contract = RouteContract::new().allows(["id"]);
        let app = Router::new().route("/items", contract.apply(get(page), context));

        let (status, body) = send(app, "/items?id=7&page=3").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "1");
    }
}
