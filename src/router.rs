use std::{collections::HashMap, fmt};

use axum::http::Method;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    List,
    Create,
    Retrieve,
    Update,
    PartialUpdate,
    Destroy,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Create => "create",
            Self::Retrieve => "retrieve",
            Self::Update => "update",
            Self::PartialUpdate => "partial_update",
            Self::Destroy => "destroy",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registration record for one resource prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSetConfig {
    pub basename: String,
    /// Name of the viewset implementation, resolved by the dispatcher.
    pub viewset: String,
    pub prefix: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    pub pattern: String,
    pub method: Method,
    pub action: Action,
    pub name: String,
    /// Prefix of the registration that generated this route.
    pub prefix: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouterError {
    #[error("No route found with name: {0}")]
    NoReverseMatch(String),
    #[error("Route {name} requires a value for `{parameter}`")]
    MissingParameter { name: String, parameter: String },
}

/// ResourceRouter
///
/// Pattern table modelled on a REST framework's default router. Every
/// registered prefix gets the six CRUD routes, and incoming `(path, method)`
/// pairs are matched back to an [`Action`].
#[derive(Debug, Default, Clone)]
pub struct ResourceRouter {
    registry: HashMap<String, ViewSetConfig>,
    routes: Vec<RoutePattern>,
}

impl ResourceRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The application's route table.
    pub fn default_routes() -> Self {
        let mut router = Self::new();
        router.register("movies", "MovieViewSet", None);
        router.register("distributors", "DistributorViewSet", None);
        router
    }

    /// register
    ///
    /// Adds a resource prefix and generates its list/create and detail routes.
    /// Registering the same prefix again replaces the earlier routes.
    pub fn register(&mut self, prefix: &str, viewset: &str, basename: Option<&str>) {
        let config = ViewSetConfig {
            basename: basename.unwrap_or(prefix).to_string(),
            viewset: viewset.to_string(),
            prefix: prefix.to_string(),
        };

        self.routes.retain(|route| route.prefix != prefix);
        self.generate_routes(&config);
        self.registry.insert(prefix.to_string(), config);
    }

    fn generate_routes(&mut self, config: &ViewSetConfig) {
        let base = format!("/{}", config.prefix);
        let detail = format!("{base}/{{id}}");

        let table = [
            (&base, Method::GET, Action::List, "list"),
            (&base, Method::POST, Action::Create, "create"),
            (&detail, Method::GET, Action::Retrieve, "detail"),
            (&detail, Method::PUT, Action::Update, "update"),
            (&detail, Method::PATCH, Action::PartialUpdate, "partial-update"),
            (&detail, Method::DELETE, Action::Destroy, "destroy"),
        ];

        for (pattern, method, action, suffix) in table {
            self.routes.push(RoutePattern {
                pattern: pattern.clone(),
                method,
                action,
                name: format!("{}-{}", config.basename, suffix),
                prefix: config.prefix.clone(),
            });
        }
    }

    pub fn routes(&self) -> &[RoutePattern] {
        &self.routes
    }

    /// Distinct patterns in the order they were first generated.
    pub fn url_patterns(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for route in &self.routes {
            if !seen.contains(&route.pattern.as_str()) {
                seen.push(route.pattern.as_str());
            }
        }
        seen
    }

    pub fn config_for(&self, route: &RoutePattern) -> Option<&ViewSetConfig> {
        self.registry.get(&route.prefix)
    }

    pub fn match_route(&self, pathname: &str, method: &Method) -> Option<&RoutePattern> {
        self.routes
            .iter()
            .find(|route| route.method == *method && pattern_matches(&route.pattern, pathname))
    }

    /// Maps each `{name}` placeholder of `pattern` to the path segment at the same position.
    pub fn extract_params(&self, pattern: &str, pathname: &str) -> HashMap<String, String> {
        pattern
            .split('/')
            .zip(pathname.split('/'))
            .filter_map(|(pattern_part, path_part)| {
                placeholder(pattern_part).map(|name| (name.to_string(), path_part.to_string()))
            })
            .collect()
    }

    /// reverse
    ///
    /// Builds the URL of a named route, substituting `{key}` placeholders.
    pub fn reverse(&self, name: &str, params: &[(&str, &str)]) -> Result<String, RouterError> {
        let route = self
            .routes
            .iter()
            .find(|route| route.name == name)
            .ok_or_else(|| RouterError::NoReverseMatch(name.to_string()))?;

        let segments = route
            .pattern
            .split('/')
            .map(|segment| match placeholder(segment) {
                Some(key) => params
                    .iter()
                    .find(|(k, _)| *k == key)
                    .map(|(_, value)| value.to_string())
                    .ok_or_else(|| RouterError::MissingParameter {
                        name: name.to_string(),
                        parameter: key.to_string(),
                    }),
                None => Ok(segment.to_string()),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(segments.join("/"))
    }
}

fn placeholder(segment: &str) -> Option<&str> {
    segment
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
        .filter(|name| !name.is_empty())
}

/// Segment-wise comparison: literals must be equal, placeholders accept any
/// non-empty segment.
fn pattern_matches(pattern: &str, pathname: &str) -> bool {
    let pattern_parts: Vec<&str> = pattern.split('/').collect();
    let path_parts: Vec<&str> = pathname.split('/').collect();

    pattern_parts.len() == path_parts.len()
        && pattern_parts
            .iter()
            .zip(&path_parts)
            .all(|(expected, actual)| match placeholder(expected) {
                Some(_) => !actual.is_empty(),
                None => expected == actual,
            })
}
