use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;

type TaskAction = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// A named unit of repeating work.
///
/// The action owns its own error handling: the scheduler never looks at what
/// it did, it only decides when it runs.
#[derive(Clone)]
pub struct PollTask {
    name: &'static str,
    interval: Duration,
    action: TaskAction,
}

impl PollTask {
    pub fn new<F, Fut>(name: &'static str, interval: Duration, action: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            name,
            interval,
            action: Arc::new(move || action().boxed()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Same action on a different period.
    pub fn with_interval(&self, interval: Duration) -> Self {
        Self {
            name: self.name,
            interval,
            action: Arc::clone(&self.action),
        }
    }

    pub(crate) fn invoke(&self) -> BoxFuture<'static, ()> {
        (self.action)()
    }
}

impl std::fmt::Debug for PollTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollTask")
            .field("name", &self.name)
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_invoke_runs_action() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let task = PollTask::new("count", Duration::from_millis(10), move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        task.invoke().await;
        task.invoke().await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_with_interval_keeps_name() {
        let task = PollTask::new("frame", Duration::from_millis(100), || async {});
        let slower = task.with_interval(Duration::from_millis(150));
        assert_eq!(slower.name(), "frame");
        assert_eq!(slower.interval(), Duration::from_millis(150));
        assert_eq!(task.interval(), Duration::from_millis(100));
    }

    #[test]
    fn test_debug_shows_name_and_interval() {
        let task = PollTask::new("logs", Duration::from_secs(2), || async {});
        let debug = format!("{:?}", task);
        assert!(debug.contains("logs"));
        assert!(debug.contains("2s"));
    }
}
