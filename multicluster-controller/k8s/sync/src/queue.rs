use ahash::{AHashMap as HashMap, AHashSet as HashSet};
use parking_lot::Mutex;
use std::{collections::VecDeque, sync::Arc, time::Duration};
use tokio::{sync::Notify, time};

/// A queue of reconciliation keys.
///
/// A key is held at most once no matter how often it is pushed, and it is
/// never handed to two workers at the same time: a key pushed while a worker
/// processes it is held back until that worker calls [`Queue::done`].
#[derive(Debug, Default)]
pub struct Queue {
    state: Mutex<State>,
    notify: Notify,
}

#[derive(Debug, Default)]
struct State {
    /// Keys ready to be handed to a worker, in push order.
    pending: VecDeque<String>,

    /// Keys that need processing, whether pending or held back.
    dirty: HashSet<String>,

    /// Keys currently held by a worker.
    processing: HashSet<String>,

    /// Consecutive failures per key.
    failures: HashMap<String, u32>,
}

// === impl Queue ===

impl Queue {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push(&self, key: impl Into<String>) {
        let key = key.into();
        let mut state = self.state.lock();
        if !state.dirty.insert(key.clone()) || state.processing.contains(&key) {
            return;
        }
        state.pending.push_back(key);
        drop(state);
        self.notify.notify_one();
    }

    pub fn extend(&self, keys: impl IntoIterator<Item = String>) {
        for key in keys {
            self.push(key);
        }
    }

    /// Pushes `key` once `delay` has elapsed.
    pub fn push_after(self: &Arc<Self>, key: String, delay: Duration) {
        if delay.is_zero() {
            self.push(key);
            return;
        }
        let queue = self.clone();
        tokio::spawn(async move {
            time::sleep(delay).await;
            queue.push(key);
        });
    }

    /// Waits for the next key. The caller must call [`Queue::done`] once it
    /// has finished processing the key.
    pub async fn pop(&self) -> String {
        loop {
            let notified = self.notify.notified();
            if let Some(key) = self.try_pop() {
                return key;
            }
            notified.await;
        }
    }

    fn try_pop(&self) -> Option<String> {
        let mut state = self.state.lock();
        let key = state.pending.pop_front()?;
        state.dirty.remove(&key);
        state.processing.insert(key.clone());
        if !state.pending.is_empty() {
            // Wake another worker for the remaining keys.
            self.notify.notify_one();
        }
        Some(key)
    }

    /// Marks a popped key as processed, releasing it if it was pushed again
    /// in the meantime.
    pub fn done(&self, key: &str) {
        let mut state = self.state.lock();
        state.processing.remove(key);
        if state.dirty.contains(key) {
            state.pending.push_back(key.to_string());
            drop(state);
            self.notify.notify_one();
        }
    }

    /// Marks a popped key as failed and pushes it again once `delay` has
    /// elapsed.
    ///
    /// Pushes of `key` made while it was being processed are folded into the
    /// delayed retry, so they cannot bypass the delay.
    pub fn retry_after(self: &Arc<Self>, key: String, delay: Duration) {
        let mut state = self.state.lock();
        state.processing.remove(&key);
        state.dirty.remove(&key);
        drop(state);
        self.push_after(key, delay);
    }

    /// Hands a popped key back without processing it. The key is the next to
    /// be popped.
    pub fn requeue(&self, key: String) {
        let mut state = self.state.lock();
        state.processing.remove(&key);
        state.dirty.insert(key.clone());
        state.pending.push_front(key);
    }

    /// Records a failed attempt for `key`, returning the number of
    /// consecutive failures.
    pub fn record_failure(&self, key: &str) -> u32 {
        let mut state = self.state.lock();
        let failures = state.failures.entry(key.to_string()).or_default();
        *failures = failures.saturating_add(1);
        *failures
    }

    /// Clears the failure history of `key`.
    pub fn forget(&self, key: &str) {
        self.state.lock().failures.remove(key);
    }

    /// The number of keys waiting to be handed to a worker.
    pub fn len(&self) -> usize {
        self.state.lock().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when no key is pending or being processed.
    pub fn is_idle(&self) -> bool {
        let state = self.state.lock();
        state.dirty.is_empty() && state.processing.is_empty()
    }
}
