//! Declarative route table.
//!
//! Each route maps a path pattern to a view and an access policy. Patterns
//! are `/`-separated static segments or `:name` parameters; there is no
//! wildcard support.

use std::collections::BTreeMap;

pub const HOME: &str = "Home";
pub const LOGIN: &str = "Login";
pub const REGISTER: &str = "Register";
pub const DASHBOARD: &str = "Dashboard";

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

/// View component a route renders. Loaded on demand by the UI layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum View {
    Home,
    Login,
    Register,
    Dashboard,
    Assignments,
    AssignmentDetail,
    Knowledge,
    Chat,
    Profile,
}

/// Per-route navigation policy. Routes require auth unless marked otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccessPolicy {
    pub requires_auth: bool,
}

impl AccessPolicy {
    pub const PUBLIC: Self = Self { requires_auth: false };
    pub const PROTECTED: Self = Self { requires_auth: true };
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::PROTECTED
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Route {
    pub path: &'static str,
    pub name: &'static str,
    pub view: View,
    pub access: AccessPolicy,
}

pub static ROUTES: &[Route] = &[
    Route { path: "/", name: HOME, view: View::Home, access: AccessPolicy::PUBLIC },
    Route { path: LOGIN_PATH, name: LOGIN, view: View::Login, access: AccessPolicy::PUBLIC },
    Route { path: "/register", name: REGISTER, view: View::Register, access: AccessPolicy::PUBLIC },
    Route { path: DASHBOARD_PATH, name: DASHBOARD, view: View::Dashboard, access: AccessPolicy::PROTECTED },
    Route { path: "/assignments", name: "Assignments", view: View::Assignments, access: AccessPolicy::PROTECTED },
    Route {
        path: "/assignments/:id",
        name: "AssignmentDetail",
        view: View::AssignmentDetail,
        access: AccessPolicy::PROTECTED,
    },
    Route { path: "/knowledge", name: "Knowledge", view: View::Knowledge, access: AccessPolicy::PROTECTED },
    Route { path: "/test", name: "Test", view: View::Knowledge, access: AccessPolicy::PUBLIC },
    Route { path: "/chat", name: "Chat", view: View::Chat, access: AccessPolicy::PROTECTED },
    Route { path: "/profile", name: "Profile", view: View::Profile, access: AccessPolicy::PROTECTED },
];

/// A resolved route plus the parameters captured from the path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteMatch {
    pub route: &'static Route,
    pub params: BTreeMap<String, String>,
}

/// Find the first route whose pattern matches `path`.
///
/// Query strings, fragments, and a trailing slash are ignored.
#[must_use]
pub fn resolve(path: &str) -> Option<RouteMatch> {
    let segments = split_path(path);
    ROUTES.iter().find_map(|route| {
        match_pattern(route.path, &segments).map(|params| RouteMatch { route, params })
    })
}

#[must_use]
pub fn by_name(name: &str) -> Option<&'static Route> {
    ROUTES.iter().find(|route| route.name == name)
}

/// Strip query/fragment and normalize to `/a/b` form.
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let segments = split_path(path);
    if segments.is_empty() { "/".to_owned() } else { format!("/{}", segments.join("/")) }
}

fn split_path(path: &str) -> Vec<&str> {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    path[..end].split('/').filter(|s| !s.is_empty()).collect()
}

fn match_pattern(pattern: &str, segments: &[&str]) -> Option<BTreeMap<String, String>> {
    let pattern_segments: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    if pattern_segments.len() != segments.len() {
        return None;
    }
    let mut params = BTreeMap::new();
    for (expected, actual) in pattern_segments.iter().zip(segments) {
        if let Some(name) = expected.strip_prefix(':') {
            params.insert(name.to_owned(), (*actual).to_owned());
        } else if expected != actual {
            return None;
        }
    }
    Some(params)
}

#[cfg(test)]
#[path = "routes_test.rs"]
mod tests;
