use std::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub user_id: String,
    pub is_admin: bool,
}

/// Supplies the signed-in user's credentials. Queried synchronously before
/// every privileged store operation.
pub trait Authenticator: Send + Sync {
    /// `None` when nobody is signed in.
    fn credentials(&self) -> Option<Credentials>;

    /// The token, but only for admins.
    fn admin_token(&self) -> Option<String> {
        self.credentials()
            .filter(|c| c.is_admin)
            .map(|c| c.token)
    }
}

/// Fixed credentials, e.g. read from configuration.
pub struct StaticAuthenticator {
    credentials: Option<Credentials>,
}

impl StaticAuthenticator {
    pub fn new(credentials: Credentials) -> Self {
        StaticAuthenticator {
            credentials: Some(credentials),
        }
    }

    pub fn anonymous() -> Self {
        StaticAuthenticator { credentials: None }
    }
}

impl Authenticator for StaticAuthenticator {
    fn credentials(&self) -> Option<Credentials> {
        self.credentials.clone()
    }
}

/// Session that can be signed into and out of at runtime.
#[derive(Default)]
pub struct SessionAuthenticator {
    session: RwLock<Option<Credentials>>,
}

impl SessionAuthenticator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sign_in(&self, credentials: Credentials) {
        tracing::info!(
            user_id = %credentials.user_id,
            is_admin = credentials.is_admin,
            "Signed in as {}",
            credentials.user_id
        );
        *self.session.write().unwrap_or_else(|e| e.into_inner()) = Some(credentials);
    }

    pub fn sign_out(&self) {
        if let Some(previous) = self
            .session
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            tracing::info!(user_id = %previous.user_id, "Signed out");
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.session
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }
}

impl Authenticator for SessionAuthenticator {
    fn credentials(&self) -> Option<Credentials> {
        self.session
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}
