// src/session.rs
use gloo_storage::{LocalStorage, Storage};

use crate::api::{Backend, Credentials};
use crate::config::AppConfig;
use crate::error::{ApiError, StorageError};

pub(crate) const LOGIN_REJECTED: &str = "Login failed";
pub(crate) const LOGIN_FAILED: &str = "Login failed. Please try again.";

/// Who is using the page. Only a signed-in teacher carries a token.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) enum Session {
    #[default]
    Anonymous,
    Teacher { token: String, username: String },
}

impl Session {
    pub(crate) fn teacher(token: impl Into<String>, username: impl Into<String>) -> Self {
        Session::Teacher {
            token: token.into(),
            username: username.into(),
        }
    }

    pub(crate) fn is_authenticated(&self) -> bool {
        matches!(self, Session::Teacher { .. })
    }

    pub(crate) fn token(&self) -> Option<&str> {
        match self {
            Session::Teacher { token, .. } => Some(token),
            Session::Anonymous => None,
        }
    }

    pub(crate) fn username(&self) -> Option<&str> {
        match self {
            Session::Teacher { username, .. } => Some(username),
            Session::Anonymous => None,
        }
    }

    pub(crate) fn status_line(&self) -> String {
        match self {
            Session::Teacher { username, .. } => format!("Logged in as {username}"),
            Session::Anonymous => "Not logged in".to_string(),
        }
    }
}

/// Durable home of the token/username pair. Both are written and removed together.
pub(crate) trait SessionStore {
    fn token(&self) -> Option<String>;
    fn username(&self) -> Option<String>;
    fn save(&self, token: &str, username: &str) -> Result<(), StorageError>;
    fn clear(&self);
}

/// Plain string key/value storage, the shape of `window.localStorage`.
pub(crate) trait RawStorage {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), String>;
    fn remove_item(&self, key: &str);
}

impl RawStorage for web_sys::Storage {
    fn get_item(&self, key: &str) -> Option<String> {
        web_sys::Storage::get_item(self, key).ok().flatten()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), String> {
        web_sys::Storage::set_item(self, key, value).map_err(|e| format!("{e:?}"))
    }

    fn remove_item(&self, key: &str) {
        // Only fails when storage is disabled, and then nothing was stored.
        let _ = web_sys::Storage::remove_item(self, key);
    }
}

/// Token and username as bare strings under the configured keys.
pub(crate) struct BrowserStore<R = web_sys::Storage> {
    raw: R,
    token_key: String,
    username_key: String,
}

impl BrowserStore {
    pub(crate) fn new(cfg: &AppConfig) -> Self {
        Self::with_storage(cfg, LocalStorage::raw())
    }
}

impl<R: RawStorage> BrowserStore<R> {
    pub(crate) fn with_storage(cfg: &AppConfig, raw: R) -> Self {
        Self {
            raw,
            token_key: cfg.token_key.clone(),
            username_key: cfg.username_key.clone(),
        }
    }

    #[cfg(test)]
    pub(crate) fn raw(&self) -> &R {
        &self.raw
    }
}

impl<R: RawStorage> SessionStore for BrowserStore<R> {
    fn token(&self) -> Option<String> {
        self.raw.get_item(&self.token_key)
    }

    fn username(&self) -> Option<String> {
        self.raw.get_item(&self.username_key)
    }

    fn save(&self, token: &str, username: &str) -> Result<(), StorageError> {
        let written = self
            .raw
            .set_item(&self.token_key, token)
            .and_then(|()| self.raw.set_item(&self.username_key, username));
        written.map_err(|reason| {
            // Never leave half a pair behind.
            self.clear();
            StorageError { reason }
        })
    }

    fn clear(&self) {
        self.raw.remove_item(&self.token_key);
        self.raw.remove_item(&self.username_key);
    }
}

/// Which session-gated controls are on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Visibility {
    pub login_button: bool,
    pub logout_button: bool,
    pub signup_form: bool,
    pub delete_icons: bool,
    pub teacher_notice: bool,
}

impl Visibility {
    pub(crate) fn for_session(session: &Session) -> Self {
        let teacher = session.is_authenticated();
        Self {
            login_button: !teacher,
            logout_button: teacher,
            signup_form: teacher,
            delete_icons: teacher,
            teacher_notice: !teacher,
        }
    }
}

/// Page-load bootstrap: revalidates a persisted token with the server.
///
/// Fails closed. Any answer other than an explicit `authenticated: true`
/// wipes the stored pair and leaves the page anonymous; the error, if there
/// was one, is handed back for logging.
pub(crate) async fn restore<B: Backend, S: SessionStore>(
    backend: &B,
    store: &S,
) -> (Session, Option<ApiError>) {
    let Some(token) = store.token() else {
        store.clear();
        return (Session::Anonymous, None);
    };

    match backend.auth_status(&token).await {
        Ok(status) if status.authenticated => {
            let username = status
                .username
                .or_else(|| store.username())
                .unwrap_or_default();
            (Session::teacher(token, username), None)
        }
        Ok(_) => {
            store.clear();
            (Session::Anonymous, None)
        }
        Err(e) => {
            store.clear();
            (Session::Anonymous, Some(e))
        }
    }
}

/// Exchanges credentials for a token and persists it. Nothing is stored on failure.
///
/// A storage failure does not undo the login; it only costs persistence
/// across reloads, so it is handed back next to the session for logging.
pub(crate) async fn login<B: Backend, S: SessionStore>(
    backend: &B,
    store: &S,
    username: &str,
    password: &str,
) -> Result<(Session, Option<StorageError>), ApiError> {
    let grant = backend
        .login(&Credentials {
            username: username.to_string(),
            password: password.to_string(),
        })
        .await?;
    let persisted = store.save(&grant.token, &grant.username).err();
    Ok((Session::teacher(grant.token, grant.username), persisted))
}

pub(crate) fn login_message(err: &ApiError) -> String {
    err.user_message(LOGIN_REJECTED, LOGIN_FAILED)
}

/// Forgets the session locally, then tells the server.
///
/// The local clear happens before the first await, so a hung server call
/// cannot keep the page logged in.
pub(crate) async fn logout<B: Backend, S: SessionStore>(
    backend: &B,
    store: &S,
    session: &Session,
) -> Result<(), ApiError> {
    store.clear();
    backend.logout(session.token()).await
}
