/// Marker attribute set on a canvas once a flock is mounted on it.
pub const MOUNTED_ATTRIBUTE: &str = "data-flock-mounted";

/// Which paths count as the site's home page.
#[derive(Debug, Clone, PartialEq)]
pub struct HomeRoute {
    /// Site roots the docs are served under besides `/`.
    pub base_paths: Vec<String>,
    pub index_document: String,
}

impl Default for HomeRoute {
    fn default() -> Self {
        Self {
            base_paths: vec!["/tech-base/".to_string()],
            index_document: "index.html".to_string(),
        }
    }
}

impl HomeRoute {
    pub fn matches(&self, path: &str) -> bool {
        if path == "/" || self.base_paths.iter().any(|base| base == path) {
            return true;
        }
        path.strip_suffix(self.index_document.as_str())
            .is_some_and(|rest| rest.ends_with('/'))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Mount,
    NotHome,
    AlreadyMounted,
}

/// Decides whether a flock should start on the current page.
pub fn decide(route: &HomeRoute, path: &str, already_mounted: bool) -> Decision {
    if !route.matches(path) {
        Decision::NotHome
    } else if already_mounted {
        Decision::AlreadyMounted
    } else {
        Decision::Mount
    }
}
