use anyhow::Result;
use futures::future::{BoxFuture, FutureExt};
use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// What a [`Poller`] currently knows; doubles as the render cache.
#[derive(Debug, Clone)]
pub struct PollState<K, T> {
    /// Key being polled right now; `None` when polling is stopped.
    pub key: Option<K>,
    /// Last successful result. Survives failed polls & key changes.
    pub data: Option<T>,
    /// Key that produced `data`, which may lag behind `key`.
    pub data_key: Option<K>,
    /// Last failure for the current key, cleared on the next success.
    pub error: Option<String>,
    pub loading: bool,
    generation: u64,
}

impl<K, T> Default for PollState<K, T> {
    fn default() -> Self {
        PollState {
            key: None,
            data: None,
            data_key: None,
            error: None,
            loading: false,
            generation: 0,
        }
    }
}

type FetchFn<K, T> = Arc<dyn Fn(K) -> BoxFuture<'static, Result<T>> + Send + Sync>;

/// Periodic fetch keyed by its dependency, e.g., the watchlist (for quotes)
/// or the active symbol (for the chart).
///
/// [`reschedule()`] with a new key cancels the running task and starts a
/// fresh one that fetches straight away, then once per `period`. Failed
/// fetches are logged & retried on the next tick only.
///
/// [`reschedule()`]: Poller::reschedule
pub struct Poller<K, T> {
    name: &'static str,
    period: Duration,
    fetch: FetchFn<K, T>,
    state: Arc<watch::Sender<PollState<K, T>>>,
    task: Option<JoinHandle<()>>,
    key: Option<K>,
}

impl<K, T> Poller<K, T>
where
    K: Clone + PartialEq + Debug + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    pub fn new<F, Fut>(name: &'static str, period: Duration, fetch: F) -> Self
    where
        F: Fn(K) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let fetch: FetchFn<K, T> = Arc::new(move |key| fetch(key).boxed());
        let (state, _) = watch::channel(PollState::default());
        Poller {
            name,
            period,
            fetch,
            state: Arc::new(state),
            task: None,
            key: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<PollState<K, T>> {
        self.state.subscribe()
    }

    pub fn key(&self) -> Option<&K> {
        self.key.as_ref()
    }

    /// Point the poller at `key`; `None` stops it. Returns `false` when the
    /// key is unchanged and the running schedule was left alone.
    pub fn reschedule(&mut self, key: Option<K>) -> bool {
        if key == self.key {
            return false;
        }
        self.stop();

        let mut generation = 0;
        self.state.send_modify(|state| {
            state.generation += 1;
            state.key = key.clone();
            state.error = None;
            state.loading = key.is_some();
            generation = state.generation;
        });
        self.key = key.clone();

        if let Some(key) = key {
            log::debug!("[{}] polling {key:?} every {:?}", self.name, self.period);
            self.task = Some(tokio::spawn(run(
                self.name,
                key,
                generation,
                self.period,
                self.fetch.clone(),
                self.state.clone(),
            )));
        } else {
            log::debug!("[{}] polling stopped", self.name);
        }
        true
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl<K, T> Drop for Poller<K, T> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run<K, T>(
    name: &'static str,
    key: K,
    generation: u64,
    period: Duration,
    fetch: FetchFn<K, T>,
    state: Arc<watch::Sender<PollState<K, T>>>,
) where
    K: Clone + Debug,
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let outcome = fetch(key.clone()).await;

        // an aborted task can still finish its last poll on another worker;
        // results for a superseded generation are discarded
        state.send_if_modified(|state| {
            if state.generation != generation {
                return false;
            }
            match outcome {
                Ok(data) => {
                    state.data = Some(data);
                    state.data_key = Some(key.clone());
                    state.error = None;
                }
                Err(ref e) => {
                    log::warn!("[{name}] poll for {key:?} failed: {e:#}");
                    state.error = Some(e.to_string());
                }
            }
            state.loading = false;
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    type Calls = Arc<Mutex<Vec<String>>>;

    fn recording(calls: &Calls, fail_after: Option<usize>) -> Poller<String, usize> {
        let calls = calls.clone();
        Poller::new("test", Duration::from_secs(10), move |key: String| {
            let calls = calls.clone();
            async move {
                let mut calls = calls.lock().unwrap();
                calls.push(key);
                let n = calls.len();
                match fail_after {
                    Some(limit) if n > limit => anyhow::bail!("upstream down"),
                    _ => Ok(n),
                }
            }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn fetches_immediately_then_every_period() {
        let calls = Calls::default();
        let mut poller = recording(&calls, None);
        assert!(poller.reschedule(Some("AAPL".to_string())));

        tokio::time::sleep(Duration::from_secs(25)).await;
        assert_eq!(calls.lock().unwrap().len(), 3);

        let state = poller.subscribe().borrow().clone();
        assert_eq!(state.data, Some(3));
        assert_eq!(state.data_key.as_deref(), Some("AAPL"));
        assert!(!state.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn same_key_does_not_restart() {
        let calls = Calls::default();
        let mut poller = recording(&calls, None);
        assert!(poller.reschedule(Some("AAPL".to_string())));
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(!poller.reschedule(Some("AAPL".to_string())));
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_poll_keeps_previous_data() {
        let calls = Calls::default();
        let mut poller = recording(&calls, Some(1));
        poller.reschedule(Some("MSFT".to_string()));

        tokio::time::sleep(Duration::from_secs(15)).await;
        let state = poller.subscribe().borrow().clone();
        assert_eq!(calls.lock().unwrap().len(), 2);
        assert_eq!(state.data, Some(1));
        assert_eq!(state.error.as_deref(), Some("upstream down"));
    }

    #[tokio::test(start_paused = true)]
    async fn new_key_refetches_and_keeps_old_data_meanwhile() {
        let calls = Calls::default();
        let mut poller = recording(&calls, None);
        poller.reschedule(Some("AAPL".to_string()));
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(poller.reschedule(Some("TSLA".to_string())));
        {
            let state = poller.subscribe().borrow().clone();
            assert_eq!(state.key.as_deref(), Some("TSLA"));
            assert_eq!(state.data_key.as_deref(), Some("AAPL"));
            assert!(state.loading);
        }

        tokio::time::sleep(Duration::from_secs(1)).await;
        let state = poller.subscribe().borrow().clone();
        assert_eq!(state.data_key.as_deref(), Some("TSLA"));
        assert_eq!(*calls.lock().unwrap(), vec!["AAPL", "TSLA"]);
    }

    #[tokio::test(start_paused = true)]
    async fn none_stops_polling() {
        let calls = Calls::default();
        let mut poller = recording(&calls, None);
        poller.reschedule(Some("NVDA".to_string()));
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(poller.reschedule(None));
        tokio::time::sleep(Duration::from_secs(60)).await;

        assert_eq!(calls.lock().unwrap().len(), 1);
        let state = poller.subscribe().borrow().clone();
        assert_eq!(state.key, None);
        assert_eq!(state.data, Some(1));
        assert!(!state.loading);
    }
}
