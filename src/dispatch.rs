// src/dispatch.rs
use crate::api::Backend;
use crate::error::ApiError;
use crate::session::Session;

pub(crate) const LOGIN_REQUIRED: &str = "Teacher login required";
const REJECTED: &str = "An error occurred";
const SIGNUP_FAILED: &str = "Failed to sign up. Please try again.";
const UNREGISTER_FAILED: &str = "Failed to unregister. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FlashKind {
    Success,
    Error,
}

impl FlashKind {
    pub(crate) fn class(self) -> &'static str {
        match self {
            FlashKind::Success => "success",
            FlashKind::Error => "error",
        }
    }
}

/// A short-lived message under the signup form or inside the login modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Flash {
    pub text: String,
    pub kind: FlashKind,
}

impl Flash {
    pub(crate) fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: FlashKind::Success,
        }
    }

    pub(crate) fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: FlashKind::Error,
        }
    }
}

/// The banner under the signup form. Every message gets a ticket for the
/// timer that will dismiss it; expiring any other ticket is a no-op.
#[derive(Debug, Default)]
pub(crate) struct MessageBoard {
    issued: u32,
    shown: Option<(u32, Flash)>,
}

impl MessageBoard {
    pub(crate) fn show(&mut self, flash: Flash) -> u32 {
        self.issued = self.issued.wrapping_add(1);
        self.shown = Some((self.issued, flash));
        self.issued
    }

    /// True when the message was still on screen and is now gone.
    pub(crate) fn expire(&mut self, ticket: u32) -> bool {
        match &self.shown {
            Some((current, _)) if *current == ticket => {
                self.shown = None;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn current(&self) -> Option<&Flash> {
        self.shown.as_ref().map(|(_, flash)| flash)
    }
}

/// Result of one signup/unregister click.
#[derive(Debug)]
pub(crate) struct Outcome {
    pub flash: Flash,
    /// Set only on success; the caller then refetches the catalog exactly once.
    pub refresh: bool,
    pub failure: Option<ApiError>,
}

impl Outcome {
    fn done(message: String) -> Self {
        Self {
            flash: Flash::success(message),
            refresh: true,
            failure: None,
        }
    }

    fn failed(err: ApiError, failed_fallback: &str) -> Self {
        Self {
            flash: Flash::error(err.user_message(REJECTED, failed_fallback)),
            refresh: false,
            failure: Some(err),
        }
    }

    fn login_required() -> Self {
        Self {
            flash: Flash::error(LOGIN_REQUIRED),
            refresh: false,
            failure: None,
        }
    }
}

/// The logged-in check is a courtesy; the server decides.
pub(crate) async fn signup<B: Backend>(backend: &B, session: &Session, activity: &str, email: &str) -> Outcome {
    if !session.is_authenticated() {
        return Outcome::login_required();
    }
    match backend.signup(session.token(), activity, email).await {
        Ok(notice) => Outcome::done(notice.message),
        Err(e) => Outcome::failed(e, SIGNUP_FAILED),
    }
}

pub(crate) async fn unregister<B: Backend>(backend: &B, session: &Session, activity: &str, email: &str) -> Outcome {
    if !session.is_authenticated() {
        return Outcome::login_required();
    }
    match backend.unregister(session.token(), activity, email).await {
        Ok(notice) => Outcome::done(notice.message),
        Err(e) => Outcome::failed(e, UNREGISTER_FAILED),
    }
}
