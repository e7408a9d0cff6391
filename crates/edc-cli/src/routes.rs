//! URL routing for the next-appointment app.
//!
//! The app exposes a single route: its root, which redirects to the admin
//! site mounted under the app name.

use serde::Serialize;

/// Namespace under which the app's routes are registered.
pub const APP_NAME: &str = "edc_next_appointment";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "to", rename_all = "snake_case")]
pub enum RouteTarget {
    Redirect(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Route {
    /// Path relative to where the app is mounted.
    pub path: &'static str,
    pub name: &'static str,
    pub target: RouteTarget,
}

impl Route {
    /// `namespace:name`, as shown in the route table.
    pub fn qualified_name(&self) -> String {
        format!("{APP_NAME}:{}", self.name)
    }
}

const ADMIN_URL: &str = "/edc_next_appointment/admin/";

static URL_PATTERNS: [Route; 1] = [Route {
    path: "",
    name: "home_url",
    target: RouteTarget::Redirect(ADMIN_URL),
}];

pub fn url_patterns() -> &'static [Route] {
    &URL_PATTERNS
}

/// Match a request path, relative to the app's mount point, against the route table.
///
/// A single leading slash is ignored, so `""` and `"/"` both hit the root.
pub fn resolve(path: &str) -> Option<&'static Route> {
    let path = path.strip_prefix('/').unwrap_or(path);
    URL_PATTERNS.iter().find(|route| route.path == path)
}
