use std::fmt;

use axum::http::Method;

use super::BoxHandler;

/// MethodTable
///
/// The handlers registered for one route template, keyed by HTTP method. Holds at
/// most one handler per method; registering a method again replaces the earlier
/// handler. Registration order is kept so `allowed()` is stable.
#[derive(Clone, Default)]
pub struct MethodTable {
    handlers: Vec<(Method, BoxHandler)>,
}

impl MethodTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, method: Method, handler: BoxHandler) {
        match self.handlers.iter_mut().find(|(m, _)| *m == method) {
            Some(entry) => {
                tracing::debug!(%method, "replacing previously registered handler");
                entry.1 = handler;
            }
            None => self.handlers.push((method, handler)),
        }
    }

    pub fn get(&self, method: &Method) -> Option<&BoxHandler> {
        self.handlers
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, handler)| handler)
    }

    /// Methods with a registered handler, in registration order.
    pub fn allowed(&self) -> impl Iterator<Item = &Method> {
        self.handlers.iter().map(|(method, _)| method)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for MethodTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.allowed()).finish()
    }
}
