//! Non-blocking front for the synchronous engine.
//!
//! A high cost makes a single hash take seconds, so callers that must not
//! block (an event loop, an async runtime worker) hand the work to a
//! [`Spawn`] implementation and await the returned future. The engine itself
//! knows nothing about this layer.
//!
//! Dropping a pending future does not stop the computation: the worker runs
//! the key schedule to completion and its result is discarded.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::runtime::Handle;
use tokio::sync::oneshot;
use zeroize::Zeroizing;

use crate::cost::validate_password;
use crate::error::{BcryptError, Result};
use crate::format::HashParts;
use crate::hasher::Hasher;

/// A unit of work handed to a [`Spawn`] implementation.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Task-submission interface.
pub trait Spawn: Send + Sync {
    /// Runs `job` somewhere other than the calling thread.
    ///
    /// An error means the job never started. Accepting the job and then
    /// dropping it resolves the pending result to
    /// [`BcryptError::TaskDropped`].
    fn spawn(&self, job: Job) -> Result<()>;
}

/// Starts one named OS thread per job.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSpawner;

impl Spawn for ThreadSpawner {
    fn spawn(&self, job: Job) -> Result<()> {
        std::thread::Builder::new()
            .name("bcrypt-worker".into())
            .spawn(job)
            .map(drop)
            .map_err(|e| {
                tracing::warn!(error = %e, "failed to start bcrypt worker thread");
                BcryptError::SpawnFailed(e.to_string())
            })
    }
}

/// Runs jobs on a tokio runtime's blocking pool.
#[derive(Debug, Clone)]
pub struct TokioSpawner {
    handle: Handle,
}

impl TokioSpawner {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Uses the runtime the caller is running on, if any.
    pub fn try_current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }
}

impl Spawn for TokioSpawner {
    fn spawn(&self, job: Job) -> Result<()> {
        drop(self.handle.spawn_blocking(job));
        Ok(())
    }
}

/// The runtime's blocking pool when called inside tokio, a fresh thread
/// per job otherwise.
#[derive(Debug, Clone)]
pub enum AutoSpawner {
    Runtime(TokioSpawner),
    Thread(ThreadSpawner),
}

impl AutoSpawner {
    pub fn current() -> Self {
        match TokioSpawner::try_current() {
            Some(spawner) => AutoSpawner::Runtime(spawner),
            None => AutoSpawner::Thread(ThreadSpawner),
        }
    }
}

impl Default for AutoSpawner {
    fn default() -> Self {
        Self::current()
    }
}

impl Spawn for AutoSpawner {
    fn spawn(&self, job: Job) -> Result<()> {
        match self {
            AutoSpawner::Runtime(spawner) => spawner.spawn(job),
            AutoSpawner::Thread(spawner) => spawner.spawn(job),
        }
    }
}

/// Result of a dispatched hash or verify call.
pub struct Pending<T> {
    receiver: oneshot::Receiver<Result<T>>,
}

pub type PendingHash = Pending<HashParts>;
pub type PendingVerify = Pending<bool>;

impl<T> Pending<T> {
    /// A pending result that is already resolved.
    pub fn ready(result: Result<T>) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(result);
        Self { receiver: rx }
    }
}

impl<T> Future for Pending<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => Poll::Ready(Err(BcryptError::TaskDropped)),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// A [`Hasher`] whose calls run on a [`Spawn`] implementation.
#[derive(Debug, Clone)]
pub struct AsyncHasher<S = AutoSpawner> {
    hasher: Hasher,
    spawner: S,
}

impl AsyncHasher<AutoSpawner> {
    /// Picks the spawner from the calling context, see [`AutoSpawner`].
    pub fn new(hasher: Hasher) -> Self {
        Self::with_spawner(hasher, AutoSpawner::current())
    }
}

impl<S: Spawn> AsyncHasher<S> {
    pub fn with_spawner(hasher: Hasher, spawner: S) -> Self {
        Self { hasher, spawner }
    }

    pub fn hasher(&self) -> &Hasher {
        &self.hasher
    }

    pub fn hash(&self, password: impl Into<Vec<u8>>) -> PendingHash {
        let password = Zeroizing::new(password.into());
        // cheap checks stay on the caller's thread
        if let Err(e) = validate_password(&password, self.hasher.length_policy()) {
            return Pending::ready(Err(e));
        }

        let hasher = self.hasher.clone();
        self.dispatch(move || hasher.hash(&*password))
    }

    pub fn verify(&self, password: impl Into<Vec<u8>>, hash: impl Into<String>) -> PendingVerify {
        let password = Zeroizing::new(password.into());
        let hash: String = hash.into();
        let expected = match HashParts::parse(&hash) {
            Ok(parts) => parts,
            Err(e) => return Pending::ready(Err(e)),
        };
        if let Err(e) = validate_password(&password, self.hasher.length_policy()) {
            return Pending::ready(Err(e));
        }

        let hasher = self.hasher.clone();
        self.dispatch(move || hasher.verify_parts(&*password, &expected))
    }

    fn dispatch<T, F>(&self, work: F) -> Pending<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let job: Job = Box::new(move || {
            if tx.send(work()).is_err() {
                tracing::trace!("bcrypt result discarded, caller went away");
            }
        });
        match self.spawner.spawn(job) {
            Ok(()) => Pending { receiver: rx },
            Err(e) => Pending::ready(Err(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::Cost;

    const U_STAR_U: &str = "$2b$05$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW";

    fn fast() -> Hasher {
        Hasher::new(Cost::new(4).unwrap())
    }

    struct Dropper;

    impl Spawn for Dropper {
        fn spawn(&self, job: Job) -> Result<()> {
            drop(job);
            Ok(())
        }
    }

    struct Refuser;

    impl Spawn for Refuser {
        fn spawn(&self, _job: Job) -> Result<()> {
            Err(BcryptError::SpawnFailed("no threads left".into()))
        }
    }

    #[tokio::test]
    async fn thread_spawner_roundtrip() {
        let hasher = AsyncHasher::with_spawner(fast(), ThreadSpawner);
        let hash = hasher.hash("pw").await.unwrap().to_string();

        assert!(hasher.verify("pw", hash.clone()).await.unwrap());
        assert!(!hasher.verify("nope", hash).await.unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn tokio_spawner_roundtrip() {
        let spawner = TokioSpawner::try_current().unwrap();
        let hasher = AsyncHasher::with_spawner(fast(), spawner);

        let hash = hasher.hash(b"pw".to_vec()).await.unwrap();
        assert!(hasher.verify("pw", hash.to_string()).await.unwrap());
    }

    #[tokio::test]
    async fn bad_input_resolves_without_dispatch() {
        let hasher = AsyncHasher::with_spawner(fast(), Dropper);

        assert!(matches!(
            hasher.verify("pw", "garbage").await,
            Err(BcryptError::MalformedHash(_))
        ));
        assert_eq!(
            hasher.hash(vec![0u8; 100]).await.unwrap_err(),
            BcryptError::PasswordTooLong { len: 100 }
        );
    }

    #[tokio::test]
    async fn dropped_job_reports_task_dropped() {
        let hasher = AsyncHasher::with_spawner(fast(), Dropper);
        assert_eq!(
            hasher.hash("pw").await.unwrap_err(),
            BcryptError::TaskDropped
        );
    }

    #[tokio::test]
    async fn refused_job_reports_spawn_failure() {
        let hasher = AsyncHasher::with_spawner(fast(), Refuser);
        assert_eq!(
            hasher.verify("pw", U_STAR_U).await.unwrap_err(),
            BcryptError::SpawnFailed("no threads left".into())
        );
    }

    #[tokio::test]
    async fn new_prefers_the_running_runtime() {
        let hasher = AsyncHasher::new(fast());
        assert!(matches!(hasher.spawner, AutoSpawner::Runtime(_)));
        assert_eq!(hasher.hasher().cost().get(), 4);

        let hash = hasher.hash("pw").await.unwrap();
        assert!(hasher.verify("pw", hash.to_string()).await.unwrap());
    }

    #[test]
    fn new_falls_back_to_threads_outside_a_runtime() {
        assert!(TokioSpawner::try_current().is_none());

        let hasher = AsyncHasher::new(fast());
        assert!(matches!(hasher.spawner, AutoSpawner::Thread(_)));

        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let hash = rt.block_on(hasher.hash("pw")).unwrap();
        assert!(rt.block_on(hasher.verify("pw", hash.to_string())).unwrap());
    }
}
