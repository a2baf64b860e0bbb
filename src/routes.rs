pub const ROOT_PATH: &str = "/";
pub const CALLBACK_PATH: &str = "/oauth-callback";
pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Protected,
    Login,
    Callback,
    Unguarded,
}

/// The guarded paths of the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    pub root: String,
    pub callback: String,
    pub login: Option<String>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self {
            root: ROOT_PATH.to_string(),
            callback: CALLBACK_PATH.to_string(),
            login: None,
        }
    }
}

impl RouteTable {
    pub fn with_login(mut self, login: impl Into<String>) -> Self {
        self.login = Some(normalize_path(login.into()));
        self
    }

    pub fn with_callback(mut self, callback: impl Into<String>) -> Self {
        self.callback = normalize_path(callback.into());
        self
    }

    pub fn classify(&self, path: &str) -> Route {
        if path == self.root {
            Route::Protected
        } else if path == self.callback {
            Route::Callback
        } else if self.login.as_deref() == Some(path) {
            Route::Login
        } else {
            Route::Unguarded
        }
    }
}

pub(crate) fn normalize_path(path: String) -> String {
    if path.is_empty() {
        "/".to_string()
    } else if path.starts_with('/') {
        path
    } else {
        format!("/{path}")
    }
}
