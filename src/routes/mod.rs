//! Route registration, split by access level.
//!
//! Each module adds its routes to the shared [`RouteTableBuilder`]. The access level
//! is applied per handler at registration time with `auth::require_auth`, so a
//! protected handler can never be registered without its guard by accident.

/// Routes open to anonymous clients.
pub mod public;

/// Routes requiring any valid, unexpired token.
pub mod authenticated;

/// Routes requiring a token with the admin flag.
pub mod admin;

use crate::{
    AppState,
    router::{RouteError, RouteTable},
};

/// Builds the complete route table for the service.
pub fn route_table(state: &AppState) -> Result<RouteTable, RouteError> {
    let builder = RouteTable::builder();
    let builder = public::public_routes(builder, state);
    let builder = authenticated::authenticated_routes(builder, state);
    let builder = admin::admin_routes(builder, state);
    builder.build()
}
