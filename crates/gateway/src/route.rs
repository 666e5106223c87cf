//! Static route table with prefix matching.
//!
//! Pattern syntax:
//! - `/api/users/**` matches `/api/users` and anything below it
//! - `/health/users` matches exactly that path
//!
//! Lookup picks the route whose literal prefix is longest; among equally long
//! prefixes the route declared first wins.

use crate::error::{GatewayError, Result};

/// Compiled path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PathPattern {
    /// `<base>/**`
    Prefix(String),
    /// Literal path.
    Exact(String),
}

impl PathPattern {
    fn parse(pattern: &str) -> Result<Self> {
        if let Some(error) = validate_pattern(pattern) {
            return Err(GatewayError::InvalidPattern(format!("{}: {}", pattern, error)));
        }

        match pattern.strip_suffix("/**") {
            Some(base) => Ok(PathPattern::Prefix(base.to_string())),
            None => Ok(PathPattern::Exact(pattern.to_string())),
        }
    }

    /// Length of the literal part matched, or `None`.
    fn match_len(&self, path: &str) -> Option<usize> {
        match self {
            PathPattern::Prefix(base) => {
                let rest = path.strip_prefix(base.as_str())?;
                if rest.is_empty() || rest.starts_with('/') {
                    Some(base.len())
                } else {
                    None
                }
            }
            PathPattern::Exact(literal) => (path == literal).then_some(literal.len()),
        }
    }
}

/// Validate a route pattern.
/// Returns an error message if invalid, None if valid.
pub fn validate_pattern(pattern: &str) -> Option<String> {
    if !pattern.starts_with('/') {
        return Some("Pattern must start with '/'".to_string());
    }

    let body = pattern.strip_suffix("/**").unwrap_or(pattern);
    if body.contains('*') {
        return Some("'**' is only allowed as the final segment".to_string());
    }
    if body.contains("//") {
        return Some("Empty segment in pattern".to_string());
    }

    None
}

/// A single route: path pattern to upstream pool.
#[derive(Debug, Clone)]
pub struct Route {
    /// Route name (e.g. `order-service`, `order-health`).
    pub name: String,
    /// Pattern as declared.
    pub pattern: String,
    /// Upstream pool the route forwards to.
    pub pool: String,
    /// Key of the service owning the route (`orders`); selects the fallback.
    pub service: String,
    /// Upstream path replacing the inbound path. `None` forwards the path as-is.
    pub rewrite: Option<String>,
    compiled: PathPattern,
}

impl Route {
    pub fn new(
        name: impl Into<String>,
        pattern: impl Into<String>,
        pool: impl Into<String>,
        service: impl Into<String>,
    ) -> Result<Self> {
        let pattern = pattern.into();
        let compiled = PathPattern::parse(&pattern)?;
        Ok(Self {
            name: name.into(),
            pattern,
            pool: pool.into(),
            service: service.into(),
            rewrite: None,
            compiled,
        })
    }

    /// Forward matches to `path` on the upstream instead of the inbound path.
    pub fn with_rewrite(mut self, path: impl Into<String>) -> Self {
        self.rewrite = Some(path.into());
        self
    }
}

/// Result of a successful lookup.
#[derive(Debug, Clone, Copy)]
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    /// Path to request on the upstream.
    pub upstream_path: &'a str,
}

/// Immutable, ordered set of routes.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// Business and health routes for one service:
    /// - `/api/<key>/**` → `<pool>`
    /// - `/health/<key>` → `<pool>/actuator/health`
    pub fn service_routes(key: &str, pool: &str) -> Result<Vec<Route>> {
        let base_name = pool.strip_suffix("-service").unwrap_or(pool);
        Ok(vec![
            Route::new(pool, format!("/api/{}/**", key), pool, key)?,
            Route::new(
                format!("{}-health", base_name),
                format!("/health/{}", key),
                pool,
                key,
            )?
            .with_rewrite("/actuator/health"),
        ])
    }

    /// Find the route for `path`.
    pub fn route<'a>(&'a self, path: &'a str) -> Option<RouteMatch<'a>> {
        let mut best: Option<(&Route, usize)> = None;

        for route in &self.routes {
            if let Some(len) = route.compiled.match_len(path) {
                // Strictly longer only: earlier declarations win ties.
                if best.map_or(true, |(_, best_len)| len > best_len) {
                    best = Some((route, len));
                }
            }
        }

        best.map(|(route, _)| RouteMatch {
            route,
            upstream_path: route.rewrite.as_deref().unwrap_or(path),
        })
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RouteTable {
        let mut routes = Vec::new();
        for (key, pool) in [
            ("users", "user-service"),
            ("orders", "order-service"),
            ("notifications", "notification-service"),
        ] {
            routes.extend(RouteTable::service_routes(key, pool).unwrap());
        }
        RouteTable::new(routes)
    }

    #[test]
    fn test_business_routes() {
        let table = table();

        let m = table.route("/api/orders/5").unwrap();
        assert_eq!(m.route.name, "order-service");
        assert_eq!(m.route.pool, "order-service");
        assert_eq!(m.route.service, "orders");
        assert_eq!(m.upstream_path, "/api/orders/5");

        let m = table.route("/api/users").unwrap();
        assert_eq!(m.route.pool, "user-service");

        let m = table.route("/api/notifications/history/alice").unwrap();
        assert_eq!(m.route.pool, "notification-service");
    }

    #[test]
    fn test_health_routes_rewrite() {
        let table = table();

        let m = table.route("/health/orders").unwrap();
        assert_eq!(m.route.name, "order-health");
        assert_eq!(m.route.pool, "order-service");
        assert_eq!(m.upstream_path, "/actuator/health");

        assert!(table.route("/health/orders/extra").is_none());
    }

    #[test]
    fn test_no_match() {
        let table = table();
        assert!(table.route("/api/ordersx/1").is_none());
        assert!(table.route("/api").is_none());
        assert!(table.route("/unknown").is_none());
        assert!(table.route("/health/payments").is_none());
    }

    #[test]
    fn test_longest_prefix_wins() {
        let table = RouteTable::new(vec![
            Route::new("catch-all", "/**", "edge", "edge").unwrap(),
            Route::new("api", "/api/**", "api", "api").unwrap(),
            Route::new("orders", "/api/orders/**", "orders", "orders").unwrap(),
        ]);

        assert_eq!(table.route("/api/orders/1").unwrap().route.name, "orders");
        assert_eq!(table.route("/api/users/1").unwrap().route.name, "api");
        assert_eq!(table.route("/static/app.js").unwrap().route.name, "catch-all");
    }

    #[test]
    fn test_ties_go_to_first_declared() {
        let table = RouteTable::new(vec![
            Route::new("first", "/api/orders/**", "a", "orders").unwrap(),
            Route::new("second", "/api/orders/**", "b", "orders").unwrap(),
        ]);
        assert_eq!(table.route("/api/orders/7").unwrap().route.name, "first");
    }

    #[test]
    fn test_validate_pattern() {
        assert!(validate_pattern("/api/users/**").is_none());
        assert!(validate_pattern("/health/users").is_none());
        assert!(validate_pattern("/**").is_none());
        assert!(validate_pattern("api/users/**").is_some());
        assert!(validate_pattern("/api/**/users").is_some());
        assert!(validate_pattern("/api/*").is_some());
        assert!(validate_pattern("/api//users").is_some());
        assert!(Route::new("bad", "/api/*", "p", "s").is_err());
    }
}
