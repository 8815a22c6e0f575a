//! Page routes.

use std::fmt;

/// A navigable page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// `/`
    Dashboard,
    /// `/contacts`
    Contacts,
    /// `/deals`, the pipeline board
    Deals,
    /// `/quotes`
    Quotes,
    /// `/companies`
    Companies,
    /// `/tasks`
    Tasks,
    /// Any other path
    NotFound,
}

impl Route {
    /// Sidebar entries, in order.
    pub const NAVIGATION: [Self; 6] = [
        Self::Dashboard,
        Self::Contacts,
        Self::Deals,
        Self::Quotes,
        Self::Companies,
        Self::Tasks,
    ];

    /// Route for a path. Leading and trailing slashes are optional.
    #[must_use]
    pub fn resolve(path: &str) -> Self {
        match path.trim().trim_matches('/') {
            "" => Self::Dashboard,
            "contacts" => Self::Contacts,
            "deals" => Self::Deals,
            "quotes" => Self::Quotes,
            "companies" => Self::Companies,
            "tasks" => Self::Tasks,
            _ => Self::NotFound,
        }
    }

    /// Path the route is served at; `*` for the catch-all.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Dashboard => "/",
            Self::Contacts => "/contacts",
            Self::Deals => "/deals",
            Self::Quotes => "/quotes",
            Self::Companies => "/companies",
            Self::Tasks => "/tasks",
            Self::NotFound => "*",
        }
    }

    /// Page heading.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Contacts => "Contacts",
            Self::Deals => "Deals",
            Self::Quotes => "Quotes",
            Self::Companies => "Companies",
            Self::Tasks => "Tasks",
            Self::NotFound => "Page Not Found",
        }
    }

    /// Whether the page shows a search box.
    #[must_use]
    pub const fn searchable(self) -> bool {
        matches!(self, Self::Contacts | Self::Quotes | Self::Companies | Self::Tasks)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve() {
        assert_eq!(Route::resolve("/"), Route::Dashboard);
        assert_eq!(Route::resolve("/contacts"), Route::Contacts);
        assert_eq!(Route::resolve("tasks/"), Route::Tasks);
        assert_eq!(Route::resolve("/reports"), Route::NotFound);
        assert_eq!(Route::resolve("/contacts/7"), Route::NotFound);
    }

    #[test]
    fn test_navigation_paths_resolve_to_themselves() {
        for route in Route::NAVIGATION {
            assert_eq!(Route::resolve(route.path()), route);
        }
    }
}
