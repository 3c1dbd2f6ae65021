//! Static route table and path matching

use std::collections::BTreeMap;

/// View rendered for a route
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum View {
    Home,
    Login,
    Register,
    Dashboard,
    Projects,
    CreateProject,
    ProjectDetail,
    Profile,
    MyApplications,
    ChatList,
    ChatRoom,
    Notifications,
    Admin,
}

/// Guard flags attached to a route
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RouteMeta {
    /// Only for signed-in users
    pub auth: bool,
    /// Only for anonymous users
    pub guest: bool,
    /// Only for the admin role
    pub admin: bool,
}

impl RouteMeta {
    pub const PUBLIC: Self = Self {
        auth: false,
        guest: false,
        admin: false,
    };
    pub const GUEST: Self = Self {
        auth: false,
        guest: true,
        admin: false,
    };
    pub const AUTH: Self = Self {
        auth: true,
        guest: false,
        admin: false,
    };
    pub const ADMIN: Self = Self {
        auth: true,
        guest: false,
        admin: true,
    };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Route {
    /// Pattern; `:name` segments capture a parameter
    pub path: &'static str,
    pub name: &'static str,
    pub view: View,
    pub meta: RouteMeta,
}

const fn route(path: &'static str, name: &'static str, view: View, meta: RouteMeta) -> Route {
    Route {
        path,
        name,
        view,
        meta,
    }
}

/// Routes of the web application
pub static ROUTES: &[Route] = &[
    route("/", "Home", View::Home, RouteMeta::PUBLIC),
    route("/login", "Login", View::Login, RouteMeta::GUEST),
    route("/register", "Register", View::Register, RouteMeta::GUEST),
    route("/dashboard", "Dashboard", View::Dashboard, RouteMeta::AUTH),
    route("/projects", "Projects", View::Projects, RouteMeta::PUBLIC),
    route("/projects/create", "CreateProject", View::CreateProject, RouteMeta::AUTH),
    route("/projects/:id", "ProjectDetail", View::ProjectDetail, RouteMeta::PUBLIC),
    route("/profile/:id", "Profile", View::Profile, RouteMeta::PUBLIC),
    route("/my-applications", "MyApps", View::MyApplications, RouteMeta::AUTH),
    route("/chat", "ChatList", View::ChatList, RouteMeta::AUTH),
    route("/chat/:roomId", "ChatRoom", View::ChatRoom, RouteMeta::AUTH),
    route("/notifications", "Notifications", View::Notifications, RouteMeta::AUTH),
    route("/admin", "Admin", View::Admin, RouteMeta::ADMIN),
];

/// A resolved location
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteMatch {
    pub route: &'static Route,
    pub params: BTreeMap<String, String>,
}

/// Immutable set of routes
#[derive(Clone, Copy, Debug)]
pub struct RouteTable {
    routes: &'static [Route],
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new(ROUTES)
    }
}

fn segments(path: &str) -> Vec<&str> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.split('/').filter(|s| !s.is_empty()).collect()
}

impl RouteTable {
    #[must_use]
    pub const fn new(routes: &'static [Route]) -> Self {
        Self { routes }
    }

    #[must_use]
    pub const fn routes(&self) -> &'static [Route] {
        self.routes
    }

    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&'static Route> {
        self.routes.iter().find(|route| route.name == name)
    }

    /// Find the route for `path`
    ///
    /// Query strings and fragments are ignored. When several patterns match,
    /// the one with the most literal segments wins, then table order.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<RouteMatch> {
        let wanted = segments(path);
        let mut best: Option<(usize, RouteMatch)> = None;

        for route in self.routes {
            let pattern = segments(route.path);
            if pattern.len() != wanted.len() {
                continue;
            }

            let mut params = BTreeMap::new();
            let mut literals = 0;
            let matched = pattern.iter().zip(&wanted).all(|(expected, actual)| {
                match expected.strip_prefix(':') {
                    Some(name) => {
                        params.insert(name.to_string(), (*actual).to_string());
                        true
                    }
                    None if expected == actual => {
                        literals += 1;
                        true
                    }
                    None => false,
                }
            });

            if matched && best.as_ref().is_none_or(|(score, _)| literals > *score) {
                best = Some((literals, RouteMatch { route, params }));
            }
        }

        best.map(|(_, found)| found)
    }
}
