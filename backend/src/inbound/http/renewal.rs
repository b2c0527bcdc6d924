//! Keeps the hosted access token alive across writes.
//!
//! A token close to expiry is renewed before the write runs. A token the
//! store still rejects is renewed once and the write retried. Refresh tokens
//! are single-use, so every renewed session goes straight into the cookie.

use std::future::Future;

use tracing::warn;

use super::session::SessionContext;
use super::state::HttpState;
use crate::domain::{AuthSession, Error, ErrorCode, Identity};

fn adopt(session: &SessionContext, renewed: AuthSession) -> Identity {
    if let Err(err) = session.persist_session(&renewed) {
        warn!(error = %err, "renewed session not persisted");
    }
    Identity::from_session(Some(renewed))
}

/// Run `write` as the caller, renewing their hosted session when needed.
///
/// Only an `Unauthorized` failure of a caller who already holds a session
/// triggers the retry; a failed renewal is returned as is.
pub(crate) async fn with_live_session<T, F, Fut>(
    state: &HttpState,
    session: &SessionContext,
    mut write: F,
) -> Result<T, Error>
where
    F: FnMut(Identity) -> Fut,
    Fut: Future<Output = Result<T, Error>>,
{
    let mut identity = session.identity();
    if let Some(renewed) = state
        .identity
        .renew_expiring(&identity, state.clock.utc())
        .await?
    {
        identity = adopt(session, renewed);
    }
    let held = identity.session().cloned();
    match write(identity).await {
        Err(err) if err.code() == ErrorCode::Unauthorized => {
            let Some(current) = held else {
                return Err(err);
            };
            warn!(message = %err.message(), "write rejected; renewing hosted session");
            let renewed = state.identity.renew(&current).await?;
            write(adopt(session, renewed)).await
        }
        other => other,
    }
}
