//! Who the user is signed in as, for as long as this process lives.
//!
//! The access token lives in a [`SessionStorage`] under [`SESSION_STORAGE_KEY`]. Nothing is
//! written to disk, so a fresh process always starts signed out. The absence of the key is
//! what "signed out" means.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// The one key the access token is stored under.
pub const SESSION_STORAGE_KEY: &str = "accessToken";

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("No token set; authentication required.")]
pub struct NoTokenError;

/// A volatile string store scoped to one session.
///
/// Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct SessionStorage {
    items: Arc<Mutex<HashMap<String, String>>>,
}

impl SessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn items(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // nothing in here can be left half-written by a panic
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get_item(&self, key: &str) -> Option<String> {
        self.items().get(key).cloned()
    }

    pub fn set_item(&self, key: &str, value: impl Into<String>) {
        self.items().insert(key.to_string(), value.into());
    }

    pub fn remove_item(&self, key: &str) {
        self.items().remove(key);
    }

    /// The current bearer token.
    pub fn access_token(&self) -> Result<String, NoTokenError> {
        self.get_item(SESSION_STORAGE_KEY).ok_or(NoTokenError)
    }
}

/// The vendor's sign-in flow.
#[allow(async_fn_in_trait)]
pub trait Authenticator {
    /// Runs the interactive sign-in and returns a bearer access token.
    async fn sign_in(&self) -> eyre::Result<String>;

    /// Tells the vendor the user signed out, e.g. by revoking `token`.
    async fn sign_out(&self, token: Option<&str>) -> eyre::Result<()>;
}

/// Gatekeeper for the bearer token used on write requests.
#[derive(Debug, Clone)]
pub struct CredentialGate<A> {
    authenticator: A,
    storage: SessionStorage,
}

impl<A> CredentialGate<A>
where
    A: Authenticator,
{
    pub fn new(authenticator: A, storage: SessionStorage) -> Self {
        Self {
            authenticator,
            storage,
        }
    }

    /// The storage the token lives in, for handing to views that need to read it.
    pub fn session(&self) -> &SessionStorage {
        &self.storage
    }

    pub fn token(&self) -> Result<String, NoTokenError> {
        self.storage.access_token()
    }

    /// True iff [`Self::token`] would succeed.
    pub fn is_signed_in(&self) -> bool {
        self.token().is_ok()
    }

    /// Signs the user in and remembers their token for the rest of the session.
    #[tracing::instrument(skip(self))]
    pub async fn sign_in(&self) -> eyre::Result<()> {
        let token = self.authenticator.sign_in().await?;
        self.storage.set_item(SESSION_STORAGE_KEY, token);
        tracing::info!("signed in");
        Ok(())
    }

    /// Signs the user out.
    ///
    /// The stored token is forgotten even if the vendor call fails; that failure is still
    /// reported.
    #[tracing::instrument(skip(self))]
    pub async fn sign_out(&self) -> eyre::Result<()> {
        let token = self.token().ok();
        let result = self.authenticator.sign_out(token.as_deref()).await;
        self.storage.remove_item(SESSION_STORAGE_KEY);
        match &result {
            Ok(()) => tracing::info!("signed out"),
            Err(e) => tracing::warn!(error = %e, "vendor sign-out failed; token cleared anyway"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct FakeVendor {
        fail_sign_in: bool,
        fail_sign_out: bool,
        sign_ins: AtomicUsize,
        revoked: Mutex<Vec<Option<String>>>,
    }

    impl Authenticator for Arc<FakeVendor> {
        async fn sign_in(&self) -> eyre::Result<String> {
            self.sign_ins.fetch_add(1, Ordering::SeqCst);
            if self.fail_sign_in {
                eyre::bail!("popup closed by user");
            }
            Ok("stub token".to_string())
        }

        async fn sign_out(&self, token: Option<&str>) -> eyre::Result<()> {
            self.revoked.lock().unwrap().push(token.map(str::to_string));
            if self.fail_sign_out {
                eyre::bail!("revocation endpoint unreachable");
            }
            Ok(())
        }
    }

    fn gate(vendor: FakeVendor) -> (CredentialGate<Arc<FakeVendor>>, Arc<FakeVendor>) {
        let vendor = Arc::new(vendor);
        (
            CredentialGate::new(Arc::clone(&vendor), SessionStorage::new()),
            vendor,
        )
    }

    #[test]
    fn no_token_until_set() {
        let (gate, _) = gate(FakeVendor::default());
        assert_eq!(gate.token(), Err(NoTokenError));
        assert_eq!(
            NoTokenError.to_string(),
            "No token set; authentication required."
        );
        assert!(!gate.is_signed_in());

        gate.session().set_item(SESSION_STORAGE_KEY, "test val");
        assert_eq!(gate.token().as_deref(), Ok("test val"));
        assert!(gate.is_signed_in());
    }

    #[test]
    fn storage_is_shared_between_clones() {
        let storage = SessionStorage::new();
        let other = storage.clone();
        storage.set_item("k", "v");
        assert_eq!(other.get_item("k").as_deref(), Some("v"));
        other.remove_item("k");
        assert_eq!(storage.get_item("k"), None);
    }

    #[tokio::test]
    async fn sign_in_stores_token() {
        let (gate, vendor) = gate(FakeVendor::default());
        gate.sign_in().await.unwrap();
        assert_eq!(vendor.sign_ins.load(Ordering::SeqCst), 1);
        assert_eq!(gate.token().as_deref(), Ok("stub token"));
    }

    #[tokio::test]
    async fn failed_sign_in_leaves_signed_out() {
        let (gate, _) = gate(FakeVendor {
            fail_sign_in: true,
            ..Default::default()
        });
        assert!(gate.sign_in().await.is_err());
        assert!(!gate.is_signed_in());
    }

    #[tokio::test]
    async fn sign_out_revokes_then_clears() {
        let (gate, vendor) = gate(FakeVendor::default());
        gate.sign_in().await.unwrap();
        gate.sign_out().await.unwrap();
        assert!(!gate.is_signed_in());
        assert_eq!(
            *vendor.revoked.lock().unwrap(),
            [Some("stub token".to_string())]
        );
    }

    #[tokio::test]
    async fn sign_out_clears_even_if_vendor_fails() {
        let (gate, _) = gate(FakeVendor {
            fail_sign_out: true,
            ..Default::default()
        });
        gate.session().set_item(SESSION_STORAGE_KEY, "token");
        assert!(gate.sign_out().await.is_err());
        assert!(!gate.is_signed_in());
    }
}
