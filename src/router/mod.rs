//! Request routing.
//!
//! A [`RouteTable`] is an ordered list of route templates, each with a
//! [`MethodTable`] of handlers. It is assembled once at startup through
//! [`RouteTableBuilder`], then shared read-only by every request.
//!
//! Dispatch is a linear scan in registration order: the first template that matches
//! the path *and* has a handler for the method wins. When some template matches the
//! path but none supports the method, the result is `405 Method Not Allowed` with an
//! `Allow` header; when nothing matches the path, `404 Not Found`.
//!
//! Authorization is not the dispatcher's concern. Handlers are wrapped with
//! `auth::require_auth` at registration time.

pub mod method_table;
pub mod template;

use std::{future::Future, pin::Pin, sync::Arc};

use axum::{
    extract::{Request, State},
    http::Method,
    response::{IntoResponse, Response},
};

pub use method_table::MethodTable;
pub use template::{PathParams, RouteTemplate, Segment};

use crate::error::ApiError;

pub type HandlerFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// BoxHandler
///
/// A terminal request handler as stored in the route table: takes the request (with
/// `PathParams` already in its extensions) and produces the response.
pub type BoxHandler = Arc<dyn Fn(Request) -> HandlerFuture + Send + Sync>;

/// Turns an axum-style handler function plus its state into a [`BoxHandler`].
///
/// This lets handlers keep using axum extractors (`State`, `Query`, `JsonBody`,
/// `PathParams`, `Claims`) while the route table does the matching.
pub fn with_state<H, T, S>(handler: H, state: S) -> BoxHandler
where
    H: axum::handler::Handler<T, S>,
    T: 'static,
    S: Clone + Send + Sync + 'static,
{
    Arc::new(move |request: Request| -> HandlerFuture {
        Box::pin(axum::handler::Handler::call(
            handler.clone(),
            request,
            state.clone(),
        ))
    })
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("route template `{0}` must start with '/'")]
    MissingLeadingSlash(String),
    #[error("route template `{template}` has a malformed segment `{segment}`")]
    MalformedSegment { template: String, segment: String },
    #[error("route template `{template}` binds parameter `{name}` more than once")]
    DuplicateParam { template: String, name: String },
    #[error("route template `{new}` matches exactly the same paths as `{existing}`")]
    Ambiguous { existing: String, new: String },
}

#[derive(Debug, Clone)]
struct Route {
    template: RouteTemplate,
    methods: MethodTable,
}

/// RouteTableBuilder
///
/// Collects registrations in order. Invalid or ambiguous templates are recorded and
/// reported by [`RouteTableBuilder::build`], so route lists can be written as one chain.
#[derive(Default)]
pub struct RouteTableBuilder {
    routes: Vec<Route>,
    errors: Vec<RouteError>,
}

impl RouteTableBuilder {
    /// Registers `handler` for `method` on `template`.
    ///
    /// Registering the same template string again adds to its method table (the last
    /// handler for a given method wins). A different template with the same shape,
    /// e.g. `/films/{id}` after `/films/{film_id}`, is rejected at build time.
    pub fn route(mut self, template: &str, method: Method, handler: BoxHandler) -> Self {
        if let Some(route) = self
            .routes
            .iter_mut()
            .find(|route| route.template.as_str() == template)
        {
            route.methods.insert(method, handler);
            return self;
        }

        let parsed = match RouteTemplate::parse(template) {
            Ok(parsed) => parsed,
            Err(e) => {
                self.errors.push(e);
                return self;
            }
        };

        for existing in &self.routes {
            if existing.template.same_shape(&parsed) {
                self.errors.push(RouteError::Ambiguous {
                    existing: existing.template.to_string(),
                    new: parsed.to_string(),
                });
                return self;
            }
            if existing.template.overlaps(&parsed) {
                tracing::warn!(
                    first = %existing.template,
                    second = %parsed,
                    "overlapping route templates; the first registered wins",
                );
            }
        }

        let mut methods = MethodTable::new();
        methods.insert(method, handler);
        self.routes.push(Route {
            template: parsed,
            methods,
        });
        self
    }

    pub fn get(self, template: &str, handler: BoxHandler) -> Self {
        self.route(template, Method::GET, handler)
    }

    pub fn post(self, template: &str, handler: BoxHandler) -> Self {
        self.route(template, Method::POST, handler)
    }

    pub fn put(self, template: &str, handler: BoxHandler) -> Self {
        self.route(template, Method::PUT, handler)
    }

    pub fn patch(self, template: &str, handler: BoxHandler) -> Self {
        self.route(template, Method::PATCH, handler)
    }

    pub fn delete(self, template: &str, handler: BoxHandler) -> Self {
        self.route(template, Method::DELETE, handler)
    }

    /// Finishes registration, failing on the first recorded template error.
    pub fn build(self) -> Result<RouteTable, RouteError> {
        if let Some(err) = self.errors.into_iter().next() {
            return Err(err);
        }
        Ok(RouteTable {
            routes: self.routes,
        })
    }
}

/// Resolution
///
/// Outcome of looking up a method and path in the [`RouteTable`].
pub enum Resolution<'a> {
    Found {
        handler: &'a BoxHandler,
        params: PathParams,
    },
    MethodNotAllowed {
        allowed: Vec<Method>,
    },
    NotFound,
}

/// RouteTable
///
/// The immutable route registry consulted for every request.
#[derive(Debug)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::default()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Registered templates, in registration order.
    pub fn templates(&self) -> impl Iterator<Item = &RouteTemplate> {
        self.routes.iter().map(|route| &route.template)
    }

    pub fn resolve(&self, method: &Method, path: &str) -> Resolution<'_> {
        let mut allowed: Vec<Method> = Vec::new();

        for route in &self.routes {
            let Some(params) = route.template.matches(path) else {
                continue;
            };
            match route.methods.get(method) {
                Some(handler) => return Resolution::Found { handler, params },
                None => {
                    for m in route.methods.allowed() {
                        if !allowed.contains(m) {
                            allowed.push(m.clone());
                        }
                    }
                }
            }
        }

        if allowed.is_empty() {
            Resolution::NotFound
        } else {
            Resolution::MethodNotAllowed { allowed }
        }
    }

    /// Resolves the request and runs its handler with the path bindings in the
    /// request extensions.
    pub async fn dispatch(&self, mut request: Request) -> Response {
        let resolution = self.resolve(request.method(), request.uri().path());
        match resolution {
            Resolution::Found { handler, params } => {
                let handler = Arc::clone(handler);
                request.extensions_mut().insert(params);
                handler(request).await
            }
            Resolution::MethodNotAllowed { allowed } => {
                ApiError::MethodNotAllowed { allowed }.into_response()
            }
            Resolution::NotFound => ApiError::RouteNotFound.into_response(),
        }
    }
}

/// Axum fallback that hands every request not claimed by an axum route (only the
/// API docs are) to the route table.
pub async fn dispatch(State(table): State<Arc<RouteTable>>, request: Request) -> Response {
    table.dispatch(request).await
}
