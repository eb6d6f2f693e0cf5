// src/testing.rs
//! In-memory stand-ins for the server and `localStorage`.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::api::{AuthStatus, Backend, Credentials, LoginGrant, Notice};
use crate::catalog::Catalog;
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::session::{BrowserStore, RawStorage};

pub(crate) const TOKEN_KEY: &str = "adminToken";
pub(crate) const USERNAME_KEY: &str = "adminUsername";

/// `localStorage` stand-in. `fail_writes` makes every `set_item` fail.
#[derive(Default)]
pub(crate) struct MemoryStorage {
    items: RefCell<HashMap<String, String>>,
    fail_writes: bool,
}

impl MemoryStorage {
    pub(crate) fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub(crate) fn item(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    pub(crate) fn put(&self, key: &str, value: &str) {
        self.items.borrow_mut().insert(key.to_string(), value.to_string());
    }
}

impl RawStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), String> {
        if self.fail_writes {
            return Err("QuotaExceededError".into());
        }
        self.put(key, value);
        Ok(())
    }

    fn remove_item(&self, key: &str) {
        self.items.borrow_mut().remove(key);
    }
}

/// The real store over in-memory storage, with the default keys.
pub(crate) type MemoryStore = BrowserStore<MemoryStorage>;

impl Default for MemoryStore {
    fn default() -> Self {
        BrowserStore::with_storage(&AppConfig::default(), MemoryStorage::default())
    }
}

impl MemoryStore {
    pub(crate) fn with_session(token: &str, username: &str) -> Self {
        let store = Self::default();
        store.raw().put(TOKEN_KEY, token);
        store.raw().put(USERNAME_KEY, username);
        store
    }

    pub(crate) fn put_username_only(&self, username: &str) {
        self.raw().put(USERNAME_KEY, username);
    }
}

/// Canned answers, one per endpoint, plus a log of every call made.
pub(crate) struct FakeBackend {
    catalog: RefCell<Result<Catalog, ApiError>>,
    status: RefCell<Result<AuthStatus, ApiError>>,
    login: RefCell<Result<LoginGrant, ApiError>>,
    logout: RefCell<Result<(), ApiError>>,
    mutation: RefCell<Result<Notice, ApiError>>,
    hang_logout: bool,
    calls: RefCell<Vec<String>>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            catalog: RefCell::new(Ok(Catalog::default())),
            status: RefCell::new(Ok(AuthStatus {
                authenticated: false,
                username: None,
            })),
            login: RefCell::new(Err(ApiError::Rejected {
                status: 401,
                detail: None,
            })),
            logout: RefCell::new(Ok(())),
            mutation: RefCell::new(Ok(Notice {
                message: "ok".into(),
            })),
            hang_logout: false,
            calls: RefCell::new(vec![]),
        }
    }
}

impl FakeBackend {
    pub(crate) fn with_catalog(self, catalog: Result<Catalog, ApiError>) -> Self {
        *self.catalog.borrow_mut() = catalog;
        self
    }

    pub(crate) fn with_status(self, status: Result<AuthStatus, ApiError>) -> Self {
        *self.status.borrow_mut() = status;
        self
    }

    pub(crate) fn with_login(self, login: Result<LoginGrant, ApiError>) -> Self {
        *self.login.borrow_mut() = login;
        self
    }

    pub(crate) fn with_logout(self, logout: Result<(), ApiError>) -> Self {
        *self.logout.borrow_mut() = logout;
        self
    }

    /// `/auth/logout` never answers.
    pub(crate) fn with_hung_logout(mut self) -> Self {
        self.hang_logout = true;
        self
    }

    /// Answer for both signup and unregister.
    pub(crate) fn with_mutation(self, mutation: Result<Notice, ApiError>) -> Self {
        *self.mutation.borrow_mut() = mutation;
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

// ApiError is not Clone; the canned error is rebuilt for each call.
fn replay<T: Clone>(canned: &RefCell<Result<T, ApiError>>) -> Result<T, ApiError> {
    match &*canned.borrow() {
        Ok(v) => Ok(v.clone()),
        Err(ApiError::Transport(m)) => Err(ApiError::Transport(m.clone())),
        Err(ApiError::Malformed(m)) => Err(ApiError::Malformed(m.clone())),
        Err(ApiError::Rejected { status, detail }) => Err(ApiError::Rejected {
            status: *status,
            detail: detail.clone(),
        }),
    }
}

fn token_label(token: Option<&str>) -> &str {
    token.unwrap_or("-")
}

impl Backend for FakeBackend {
    async fn activities(&self) -> Result<Catalog, ApiError> {
        self.record("activities".into());
        replay(&self.catalog)
    }

    async fn auth_status(&self, token: &str) -> Result<AuthStatus, ApiError> {
        self.record(format!("auth_status token={token}"));
        replay(&self.status)
    }

    async fn login(&self, credentials: &Credentials) -> Result<LoginGrant, ApiError> {
        self.record(format!("login user={}", credentials.username));
        replay(&self.login)
    }

    async fn logout(&self, token: Option<&str>) -> Result<(), ApiError> {
        self.record(format!("logout token={}", token_label(token)));
        if self.hang_logout {
            futures::future::pending::<()>().await;
        }
        replay(&self.logout)
    }

    async fn signup(&self, token: Option<&str>, activity: &str, email: &str) -> Result<Notice, ApiError> {
        self.record(format!("signup {activity} {email} token={}", token_label(token)));
        replay(&self.mutation)
    }

    async fn unregister(&self, token: Option<&str>, activity: &str, email: &str) -> Result<Notice, ApiError> {
        self.record(format!("unregister {activity} {email} token={}", token_label(token)));
        replay(&self.mutation)
    }
}
