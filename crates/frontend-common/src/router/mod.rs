//! Route table and navigation guard

pub mod guard;
pub mod routes;

pub use guard::{decide, Decision, NavigationError, Router};
pub use routes::{Route, RouteMatch, RouteMeta, RouteTable, View, ROUTES};
