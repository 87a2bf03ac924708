//! Yes/no confirmation backed by a single pending slot.
//!
//! [`Confirm::confirm`] opens the dialog and returns a [`Confirmation`]
//! future; the host renders [`Confirm::dialog`] and forwards the user's
//! choice to [`Confirm::handle_confirm`] or [`Confirm::handle_cancel`], which
//! resolve the future and close the dialog.
//!
//! Only one request can be pending. Asking again before the user answers
//! resolves the older request with [`ConfirmError::Superseded`] rather than
//! leaving it hanging.

use std::future::Future;
use std::pin::Pin;
use std::task::Context;
use std::task::Poll;

use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use tracing::warn;

type Outcome = Result<bool, ConfirmError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConfirmError {
    #[error("confirmation was superseded by a newer request")]
    Superseded,

    #[error("confirmation closed without an answer")]
    Closed,
}

pub struct Confirm {
    title: String,
    message: String,
    pending: Option<oneshot::Sender<Outcome>>,
}

/// What the host needs to draw the dialog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfirmDialog {
    pub open: bool,
    pub title: String,
    pub message: String,
}

impl Confirm {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            pending: None,
        }
    }

    pub fn confirm(&mut self) -> Confirmation {
        let (tx, rx) = oneshot::channel();
        if let Some(stale) = self.pending.replace(tx) {
            warn!(title = %self.title, "confirmation requested while one was pending");
            let _ = stale.send(Err(ConfirmError::Superseded));
        }
        Confirmation { rx }
    }

    pub fn is_open(&self) -> bool {
        self.pending.is_some()
    }

    pub fn dialog(&self) -> ConfirmDialog {
        ConfirmDialog {
            open: self.is_open(),
            title: self.title.clone(),
            message: self.message.clone(),
        }
    }

    /// Resolves the pending request with `true`. Returns false when nothing
    /// was pending.
    pub fn handle_confirm(&mut self) -> bool {
        self.resolve(true)
    }

    /// Resolves the pending request with `false`.
    pub fn handle_cancel(&mut self) -> bool {
        self.resolve(false)
    }

    fn resolve(&mut self, answer: bool) -> bool {
        let Some(tx) = self.pending.take() else {
            return false;
        };
        // The requester may have stopped waiting; that is not an error here.
        let _ = tx.send(Ok(answer));
        true
    }
}

/// Resolves to the user's answer.
#[must_use = "a confirmation does nothing unless awaited or polled"]
pub struct Confirmation {
    rx: oneshot::Receiver<Outcome>,
}

impl Confirmation {
    /// Non-blocking check for hosts that poll from their event loop.
    pub fn try_outcome(&mut self) -> Option<Outcome> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => Some(Err(ConfirmError::Closed)),
        }
    }
}

impl Future for Confirmation {
    type Output = Outcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(ConfirmError::Closed)))
    }
}
