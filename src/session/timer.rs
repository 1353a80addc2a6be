use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Events delivered to whoever owns the active session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The marking window of `session_id` has elapsed.
    Expired { session_id: Uuid },
}

/// Fires a single [`SessionEvent::Expired`] after the marking window.
///
/// Dropping or cancelling the timer aborts the pending task, so an abandoned
/// session never receives a late expiry. Must be armed inside a tokio runtime.
#[derive(Debug)]
pub struct ExpiryTimer {
    session_id: Uuid,
    handle: JoinHandle<()>,
}

impl ExpiryTimer {
    pub fn arm(session_id: Uuid, window: Duration, events: UnboundedSender<SessionEvent>) -> Self {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            tracing::debug!(%session_id, "Marking window elapsed");
            // Receiver gone means nobody is listening any more.
            let _ = events.send(SessionEvent::Expired { session_id });
        });
        Self { session_id, handle }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Whether the expiry has already been sent (or the task was aborted).
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn cancel(self) {
        // Drop does the work.
    }
}

impl Drop for ExpiryTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn fires_once_after_window() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = Uuid::new_v4();
        let _timer = ExpiryTimer::arm(id, Duration::from_secs(600), tx);

        tokio::time::sleep(Duration::from_secs(599)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(rx.try_recv(), Ok(SessionEvent::Expired { session_id: id }));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_timer_never_fires() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let timer = ExpiryTimer::arm(Uuid::new_v4(), Duration::from_secs(600), tx);
        timer.cancel();

        tokio::time::sleep(Duration::from_secs(1200)).await;
        // Sender was dropped with the aborted task.
        assert_eq!(rx.recv().await, None);
    }
}
