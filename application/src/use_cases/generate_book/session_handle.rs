//! Shared, serialized access to a session.

use super::types::GenerateBookError;
use bookwright_domain::GenerationSession;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

/// A [`GenerationSession`] shared between tasks.
///
/// Holding the guard is what allows an orchestrator operation to run, so at
/// most one operation is in flight per session. Handles to different
/// sessions never contend.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<Mutex<GenerationSession>>,
}

impl SessionHandle {
    pub fn new(session: GenerationSession) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// Wait until no other operation holds the session.
    pub async fn lock(&self) -> MutexGuard<'_, GenerationSession> {
        self.inner.lock().await
    }

    /// Fail fast with `SessionBusy` while another operation is running.
    pub fn try_lock(&self) -> Result<MutexGuard<'_, GenerationSession>, GenerateBookError> {
        self.inner
            .try_lock()
            .map_err(|_| GenerateBookError::SessionBusy)
    }

    /// Copy of the current session state.
    pub async fn snapshot(&self) -> GenerationSession {
        self.inner.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use bookwright_domain::GenerationErrorKind;

    #[tokio::test]
    async fn test_try_lock_reports_busy() {
        let handle = SessionHandle::new(session(3));
        let guard = handle.lock().await;

        let err = handle.try_lock().unwrap_err();
        assert_eq!(err, GenerateBookError::SessionBusy);
        assert_eq!(err.kind(), GenerationErrorKind::InvalidRequest);

        drop(guard);
        assert!(handle.try_lock().is_ok());
    }

    #[tokio::test]
    async fn test_operations_through_handle_are_serialized() {
        let gateway = ScriptedGateway::new(vec![Ok("One.".into()), Ok("Two.".into())]);
        let use_case = use_case(gateway.clone());
        let handle = SessionHandle::new(session(3));

        let first = {
            let handle = handle.clone();
            let use_case = use_case.clone();
            tokio::spawn(async move {
                let mut session = handle.lock().await;
                use_case.generate_chapter(&mut session, 1).await
            })
        };
        let second = {
            let handle = handle.clone();
            let use_case = use_case.clone();
            tokio::spawn(async move {
                let mut session = handle.lock().await;
                use_case.generate_chapter(&mut session, 1).await
            })
        };
        assert!(first.await.unwrap().is_ok());
        assert!(second.await.unwrap().is_ok());

        let session = handle.snapshot().await;
        assert_eq!(session.generated_count(), 1);
        assert_eq!(gateway.max_in_flight(), 1);
    }
}
