//! Cooperative cancellation for long-running pipelines.

use tokio_util::sync::{CancellationToken, DropGuard};

use crate::error::{Result, SsgError};

/// Fail with [`SsgError::Cancelled`] once the token has fired.
pub fn checkpoint(token: &CancellationToken) -> Result<()> {
    if token.is_cancelled() {
        Err(SsgError::Cancelled)
    } else {
        Ok(())
    }
}

/// Token tied to a request: dropping the guard (e.g. when the client
/// disconnects and the handler future is dropped) cancels the token.
pub fn request_token() -> (CancellationToken, DropGuard) {
    let token = CancellationToken::new();
    let guard = token.clone().drop_guard();
    (token, guard)
}
