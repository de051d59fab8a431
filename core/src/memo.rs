use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::task::JoinError;
use tracing::debug;

/// What happens to a cache entry whose call failed, once every caller
/// waiting on it has received the failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Keep the failure and replay it to all later callers with the same key.
    Sticky,
    /// Drop the failed entry so the next call with the same key retries.
    #[default]
    Evict,
}

type Slot<T, E> = Shared<BoxFuture<'static, Result<T, E>>>;

/// Request-coalescing cache: at most one call per key is in flight, and a
/// completed outcome is served to every later caller with that key.
///
/// Each call runs on its own task, so it completes even if every caller
/// awaiting it goes away. Entries live as long as the memoizer unless
/// [`Memoizer::clear`] is called or a failure is evicted under
/// [`FailurePolicy::Evict`].
pub struct Memoizer<T, E> {
    entries: Mutex<HashMap<String, Slot<T, E>>>,
    policy: FailurePolicy,
}

impl<T, E> Memoizer<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + From<JoinError> + 'static,
{
    pub fn new(policy: FailurePolicy) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            policy,
        }
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Return the outcome cached under `key`, or run `f` to produce it.
    ///
    /// Callers arriving while the first call for `key` is still pending wait
    /// on that same call; `f` is not invoked for them. Must be called from
    /// within a tokio runtime.
    pub async fn run<F, Fut>(&self, key: String, f: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        // Look-up-or-insert must not suspend.
        let slot = {
            let mut entries = self.lock();
            match entries.get(&key) {
                Some(slot) => {
                    debug!("memo: hit for key of {} bytes", key.len());
                    slot.clone()
                }
                None => {
                    let task = tokio::spawn(f());
                    let slot: Slot<T, E> =
                        async move { task.await.unwrap_or_else(|err| Err(E::from(err))) }
                            .boxed()
                            .shared();
                    entries.insert(key.clone(), slot.clone());
                    slot
                }
            }
        };

        let outcome = slot.clone().await;

        if outcome.is_err() && self.policy == FailurePolicy::Evict {
            let mut entries = self.lock();
            if entries
                .get(&key)
                .is_some_and(|current| current.ptr_eq(&slot))
            {
                debug!("memo: evicting failed entry");
                entries.remove(&key);
            }
        }

        outcome
    }

    /// Drop every cached entry. Calls already in flight still complete for
    /// the callers awaiting them.
    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Slot<T, E>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T, E> Default for Memoizer<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + From<JoinError> + 'static,
{
    fn default() -> Self {
        Self::new(FailurePolicy::default())
    }
}
