//! Authenticated owner resolution
//!
//! The account behind the access token is the owner of every repository the
//! service looks at. It is fetched once and kept for the life of the process.

use crate::api::RepositoryApiClient;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use repolens_core::{ErrorContext, ErrorKind, RepoLensError, RepoLensResult};
use std::sync::Arc;
use tracing::{debug, info, warn};

type PendingLogin = Shared<BoxFuture<'static, RepoLensResult<String>>>;

enum OwnerState {
    Unset,
    /// A lookup is in flight; every caller awaits the same future
    Resolving(PendingLogin),
    Resolved(String),
    /// The client has no way to look up its identity
    Unavailable(RepoLensError),
}

/// Memoizing resolver for the authenticated owner login
pub struct OwnerResolver {
    client: Arc<dyn RepositoryApiClient>,
    state: Mutex<OwnerState>,
}

impl OwnerResolver {
    pub fn new(client: Arc<dyn RepositoryApiClient>) -> Self {
        Self {
            client,
            state: Mutex::new(OwnerState::Unset),
        }
    }

    /// Resolve the owner login, issuing at most one remote lookup at a time
    ///
    /// Concurrent first callers share one lookup. A failed lookup is reported
    /// to everyone waiting on it and forgotten, so the next call tries again.
    pub async fn resolve_owner(&self) -> RepoLensResult<String> {
        let pending = {
            let mut state = self.state.lock();
            match &*state {
                OwnerState::Resolved(login) => return Ok(login.clone()),
                OwnerState::Unavailable(error) => return Err(error.clone()),
                OwnerState::Resolving(pending) => {
                    debug!("Joining in-flight owner lookup");
                    pending.clone()
                }
                OwnerState::Unset => {
                    debug!("Starting owner lookup");
                    let client = Arc::clone(&self.client);
                    let pending = async move { lookup_login(client).await }.boxed().shared();
                    *state = OwnerState::Resolving(pending.clone());
                    pending
                }
            }
        };

        let outcome = pending.clone().await;
        self.settle(&pending, &outcome);
        outcome
    }

    /// The cached owner, if it has been resolved
    pub fn cached_owner(&self) -> Option<String> {
        match &*self.state.lock() {
            OwnerState::Resolved(login) => Some(login.clone()),
            _ => None,
        }
    }

    fn settle(&self, pending: &PendingLogin, outcome: &RepoLensResult<String>) {
        let mut state = self.state.lock();

        // Only the lookup that is still current may move the state on.
        let is_current =
            matches!(&*state, OwnerState::Resolving(current) if current.ptr_eq(pending));
        if !is_current {
            return;
        }

        *state = match outcome {
            Ok(login) => {
                info!(owner = %login, "Resolved repository owner");
                OwnerState::Resolved(login.clone())
            }
            Err(error) if error.kind() == ErrorKind::ConfigurationError => {
                OwnerState::Unavailable(error.clone())
            }
            Err(error) => {
                warn!(error = %error, "Owner lookup failed; next request will retry");
                OwnerState::Unset
            }
        };
    }
}

async fn lookup_login(client: Arc<dyn RepositoryApiClient>) -> RepoLensResult<String> {
    match client.get_authenticated_login().await {
        Ok(login) => Ok(login),
        Err(error) if error.kind() == ErrorKind::ConfigurationError => Err(error),
        // Identity failures are never reported as a missing resource.
        Err(error) => Err(RepoLensError::Upstream {
            message: "Failed to determine repository owner from the access token".to_string(),
            status: error.status(),
            original_message: error
                .original_message()
                .map(str::to_string)
                .or_else(|| Some(error.to_string())),
            context: ErrorContext::new("owner_resolver")
                .with_operation("resolve_owner")
                .with_suggestion("Check that the access token is valid"),
            source: Some(Arc::new(error)),
        }),
    }
}
