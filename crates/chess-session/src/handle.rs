//! Shared access to a session, with scheduled computer replies.

use std::sync::Arc;
use std::time::Duration;

use chess_rules::{Role, Square};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::SessionError;
use crate::mode::GameMode;
use crate::session::{GameSession, SessionSnapshot};

/// Delay before the computer answers a move.
pub const DEFAULT_AUTOPLAY_DELAY: Duration = Duration::from_millis(300);

struct State {
    session: GameSession,
    pending: Option<JoinHandle<()>>,
    generation: u64,
}

struct Inner {
    state: Mutex<State>,
    pending_tx: watch::Sender<bool>,
    delay: Duration,
}

/// A cloneable handle to one game session.
///
/// All access goes through an async mutex. In AI modes an accepted human
/// move schedules the computer's reply as a separate task; until that task
/// has played, further human moves fail with
/// [`SessionError::AutoplayPending`]. Resetting or changing mode cancels a
/// scheduled reply.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<Inner>,
}

impl SessionHandle {
    pub fn new(session: GameSession, delay: Duration) -> Self {
        let (pending_tx, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    session,
                    pending: None,
                    generation: 0,
                }),
                pending_tx,
                delay,
            }),
        }
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.inner.state.lock().await.session.snapshot()
    }

    /// Returns true while a computer reply is scheduled.
    pub fn is_pending(&self) -> bool {
        *self.inner.pending_tx.borrow()
    }

    pub async fn select_square(&self, square: Square) -> Vec<Square> {
        self.inner.state.lock().await.session.select_square(square)
    }

    /// Plays a human move and, in AI modes, schedules the reply.
    pub async fn apply_move(
        &self,
        from: Square,
        to: Square,
        promotion: Option<Role>,
    ) -> Result<SessionSnapshot, SessionError> {
        let mut state = self.inner.state.lock().await;
        if state.pending.is_some() {
            debug!(%from, %to, "move refused while computer reply is pending");
            return Err(SessionError::AutoplayPending);
        }

        state.session.play_move(from, to, promotion)?;

        if state.session.mode().is_ai() && !state.session.is_game_over() {
            self.schedule(&mut state);
        }
        Ok(state.session.snapshot())
    }

    pub async fn reset(&self) -> SessionSnapshot {
        let mut state = self.inner.state.lock().await;
        self.cancel(&mut state);
        state.session.reset();
        state.session.snapshot()
    }

    pub async fn change_mode(&self, mode: GameMode) -> Result<SessionSnapshot, SessionError> {
        let mut state = self.inner.state.lock().await;
        state.session.change_mode(mode)?;
        self.cancel(&mut state);
        Ok(state.session.snapshot())
    }

    /// Cancels any scheduled computer reply. The board is left as it is.
    ///
    /// Called when the session is discarded so no task outlives it.
    pub async fn close(&self) {
        let mut state = self.inner.state.lock().await;
        self.cancel(&mut state);
    }

    /// Waits until no computer reply is scheduled, then returns the state.
    pub async fn settle(&self) -> SessionSnapshot {
        let mut rx = self.inner.pending_tx.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = rx.wait_for(|pending| !*pending).await;
        self.snapshot().await
    }

    fn schedule(&self, state: &mut State) {
        state.generation += 1;
        let generation = state.generation;
        let inner = Arc::clone(&self.inner);

        self.inner.pending_tx.send_replace(true);
        state.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(inner.delay).await;

            let mut state = inner.state.lock().await;
            if state.generation != generation {
                return;
            }
            if let Some(reply) = state.session.autoplay_move() {
                info!(san = %reply.san, mode = %state.session.mode(), "computer moved");
            }
            state.pending = None;
            inner.pending_tx.send_replace(false);
        }));
    }

    fn cancel(&self, state: &mut State) {
        state.generation += 1;
        if let Some(task) = state.pending.take() {
            task.abort();
            debug!("scheduled computer reply cancelled");
        }
        self.inner.pending_tx.send_replace(false);
    }
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new(GameSession::new(), DEFAULT_AUTOPLAY_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle() -> SessionHandle {
        SessionHandle::new(GameSession::new(), Duration::from_millis(20))
    }

    #[tokio::test]
    async fn local_moves_never_schedule() {
        let handle = handle();
        let snapshot = handle.apply_move(Square::E2, Square::E4, None).await.unwrap();
        assert_eq!(snapshot.history, vec!["e4"]);
        assert!(!handle.is_pending());

        let snapshot = handle.apply_move(Square::E7, Square::E5, None).await.unwrap();
        assert_eq!(snapshot.history.len(), 2);
    }

    #[tokio::test]
    async fn illegal_move_is_an_error() {
        let handle = handle();
        let err = handle
            .apply_move(Square::E2, Square::E5, None)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            SessionError::IllegalMove {
                from: Square::E2,
                to: Square::E5
            }
        );
        assert!(handle.snapshot().await.history.is_empty());
    }

    #[tokio::test]
    async fn close_cancels_pending_reply() {
        let handle = handle();
        handle.change_mode(GameMode::AiEasy).await.unwrap();
        handle.apply_move(Square::E2, Square::E4, None).await.unwrap();
        assert!(handle.is_pending());

        handle.close().await;
        assert!(!handle.is_pending());

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(handle.snapshot().await.history, vec!["e4"]);
    }

    #[tokio::test]
    async fn online_mode_is_refused() {
        let handle = handle();
        let err = handle.change_mode(GameMode::Online).await.unwrap_err();
        assert_eq!(err, SessionError::ModeDisabled(GameMode::Online));
        assert_eq!(handle.snapshot().await.mode, GameMode::Local);
    }
}
