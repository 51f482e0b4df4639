//! Page routes of the front end.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Posts,
    Categories,
    MyThreads,
    Profile,
    Login,
    Signup,
    Post(String),
}

/// A resolved path. `redirected` is set when the input matched no route and
/// fell back to `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub route: Route,
    pub redirected: bool,
}

impl Route {
    pub fn resolve(path: &str) -> Resolved {
        match Self::parse(path) {
            Some(route) => Resolved {
                route,
                redirected: false,
            },
            None => Resolved {
                route: Route::Posts,
                redirected: true,
            },
        }
    }

    /// Matches a path exactly; query strings, fragments and trailing slashes
    /// are ignored.
    pub fn parse(path: &str) -> Option<Self> {
        let path = path
            .split(&['?', '#'][..])
            .next()
            .unwrap_or_default()
            .trim();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Some(Route::Posts),
            ["categories"] => Some(Route::Categories),
            ["my-threads"] => Some(Route::MyThreads),
            ["profile"] => Some(Route::Profile),
            ["login"] => Some(Route::Login),
            ["signup"] => Some(Route::Signup),
            ["post", id] => Some(Route::Post((*id).to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Posts => f.write_str("/"),
            Route::Categories => f.write_str("/categories"),
            Route::MyThreads => f.write_str("/my-threads"),
            Route::Profile => f.write_str("/profile"),
            Route::Login => f.write_str("/login"),
            Route::Signup => f.write_str("/signup"),
            Route::Post(id) => write!(f, "/post/{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_paths() {
        assert_eq!(Route::parse("/"), Some(Route::Posts));
        assert_eq!(Route::parse(""), Some(Route::Posts));
        assert_eq!(Route::parse("/categories/"), Some(Route::Categories));
        assert_eq!(Route::parse("/my-threads"), Some(Route::MyThreads));
        assert_eq!(Route::parse("/profile?tab=threads"), Some(Route::Profile));
        assert_eq!(Route::parse("/login"), Some(Route::Login));
        assert_eq!(Route::parse("/signup#form"), Some(Route::Signup));
        assert_eq!(Route::parse("/post/42"), Some(Route::Post("42".into())));
    }

    #[test]
    fn unknown_paths_redirect_home() {
        for path in ["/nope", "/post", "/post/", "/post/1/edit", "/profile/1"] {
            let resolved = Route::resolve(path);
            assert_eq!(resolved.route, Route::Posts, "{path}");
            assert!(resolved.redirected, "{path}");
        }
        assert!(!Route::resolve("/categories").redirected);
    }

    #[test]
    fn display_round_trips() {
        for route in [
            Route::Posts,
            Route::Categories,
            Route::MyThreads,
            Route::Profile,
            Route::Login,
            Route::Signup,
            Route::Post("7".into()),
        ] {
            assert_eq!(Route::parse(&route.to_string()), Some(route));
        }
    }
}
