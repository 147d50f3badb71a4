//! Periodic poll task scheduling.
//!
//! Each armed task owns exactly one timer loop. Arming a task that already has
//! a timer clears the old one first, so restarting never leaves two pollers
//! behind for the same task. Every tick runs the action as its own Tokio task:
//! actions may overlap, and a panicking action cannot take its timer down.

mod task;

pub use task::PollTask;

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use futures::FutureExt;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Name of the frame/status poll task.
pub const FRAME_TASK: &str = "frame";
/// Name of the activity log poll task.
pub const LOGS_TASK: &str = "logs";

struct Timer {
    interval: Duration,
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

impl Timer {
    fn clear(self) {
        self.cancel.cancel();
        self.join.abort();
    }
}

#[derive(Default)]
struct SchedulerInner {
    running: bool,
    /// Registered task definitions, in registration order. Survive `stop()`
    /// so `resume()` can re-arm them.
    tasks: Vec<PollTask>,
    timers: HashMap<&'static str, Timer>,
}

impl SchedulerInner {
    fn register(&mut self, task: &PollTask) {
        match self.tasks.iter_mut().find(|t| t.name() == task.name()) {
            Some(existing) => *existing = task.clone(),
            None => self.tasks.push(task.clone()),
        }
    }

    fn arm(&mut self, task: PollTask, run_now: bool) {
        if let Some(previous) = self.timers.remove(task.name()) {
            debug!(
                event = "core.scheduler.timer_replaced",
                task = task.name(),
                old_interval_ms = previous.interval.as_millis() as u64,
            );
            previous.clear();
        }
        self.register(&task);

        if run_now {
            spawn_action(&task);
        }

        let cancel = CancellationToken::new();
        let interval = task.interval();
        let first_tick = Instant::now() + interval;
        let join = tokio::spawn(run_timer(task.clone(), first_tick, cancel.clone()));
        self.timers.insert(
            task.name(),
            Timer {
                interval,
                cancel,
                join,
            },
        );
    }

    fn clear_timers(&mut self) -> usize {
        let cleared = self.timers.len();
        for (_, timer) in self.timers.drain() {
            timer.clear();
        }
        cleared
    }
}

/// Owns the set of active poll tasks and their timers.
///
/// `start`, `stop`, `restart` and `retime` each hold the scheduler lock for
/// their whole duration, so they are atomic with respect to one another.
/// All arming operations must run inside a Tokio runtime.
pub struct UpdateScheduler {
    inner: Mutex<SchedulerInner>,
}

impl UpdateScheduler {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(SchedulerInner::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SchedulerInner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!(event = "core.scheduler.lock_poisoned");
                poisoned.into_inner()
            }
        }
    }

    /// Arm every task: clear any existing timer for it, register a new
    /// periodic timer, and run the action once right away.
    pub fn start(&self, tasks: impl IntoIterator<Item = PollTask>) {
        let mut inner = self.lock();
        for task in tasks {
            inner.arm(task, true);
        }
        inner.running = true;
        info!(
            event = "core.scheduler.start_completed",
            timers = inner.timers.len(),
        );
    }

    /// Clear every timer. In-flight actions are left to finish on their own.
    ///
    /// No-op when already stopped.
    pub fn stop(&self) {
        let mut inner = self.lock();
        let cleared = inner.clear_timers();
        let was_running = std::mem::replace(&mut inner.running, false);
        if was_running || cleared > 0 {
            info!(event = "core.scheduler.stop_completed", cleared = cleared);
        } else {
            debug!(event = "core.scheduler.stop_skipped", reason = "not running");
        }
    }

    /// `stop()` followed by `start(tasks)` under a single lock.
    pub fn restart(&self, tasks: impl IntoIterator<Item = PollTask>) {
        let mut inner = self.lock();
        let cleared = inner.clear_timers();
        for task in tasks {
            inner.arm(task, true);
        }
        inner.running = true;
        info!(
            event = "core.scheduler.restart_completed",
            cleared = cleared,
            timers = inner.timers.len(),
        );
    }

    /// Re-arm every registered task with its latest interval.
    ///
    /// Returns `false` when there is nothing to resume.
    pub fn resume(&self) -> bool {
        let mut inner = self.lock();
        if inner.tasks.is_empty() {
            debug!(event = "core.scheduler.resume_skipped", reason = "no tasks");
            return false;
        }
        let tasks = inner.tasks.clone();
        for task in tasks {
            inner.arm(task, true);
        }
        inner.running = true;
        info!(
            event = "core.scheduler.resume_completed",
            timers = inner.timers.len(),
        );
        true
    }

    /// Change a registered task's period.
    ///
    /// While running, the task's timer is replaced by one whose first tick is
    /// a full new period away; the action is not invoked immediately. While
    /// stopped, only the stored interval changes and the next `start`/`resume`
    /// picks it up; no timer is created. Returns whether a live timer was
    /// replaced.
    pub fn retime(&self, name: &str, interval: Duration) -> bool {
        let mut inner = self.lock();
        let Some(task) = inner.tasks.iter().find(|t| t.name() == name).cloned() else {
            warn!(event = "core.scheduler.retime_unknown_task", task = name);
            return false;
        };
        let task = task.with_interval(interval);

        if !inner.running || !inner.timers.contains_key(task.name()) {
            debug!(
                event = "core.scheduler.retime_deferred",
                task = task.name(),
                interval_ms = interval.as_millis() as u64,
            );
            inner.register(&task);
            return false;
        }

        info!(
            event = "core.scheduler.retime_completed",
            task = task.name(),
            interval_ms = interval.as_millis() as u64,
        );
        inner.arm(task, false);
        true
    }

    pub fn is_running(&self) -> bool {
        self.lock().running
    }

    /// Number of armed timers.
    pub fn live_timers(&self) -> usize {
        self.lock().timers.len()
    }

    /// Registered interval for a task, whether or not it is armed.
    pub fn interval_of(&self, name: &str) -> Option<Duration> {
        self.lock()
            .tasks
            .iter()
            .find(|t| t.name() == name)
            .map(PollTask::interval)
    }
}

impl Default for UpdateScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for UpdateScheduler {
    fn drop(&mut self) {
        let inner = match self.inner.get_mut() {
            Ok(inner) => inner,
            Err(poisoned) => poisoned.into_inner(),
        };
        inner.clear_timers();
    }
}

async fn run_timer(task: PollTask, first_tick: Instant, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval_at(first_tick, task.interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                if cancel.is_cancelled() {
                    break;
                }
                spawn_action(&task);
            }
        }
    }
}

fn spawn_action(task: &PollTask) {
    let name = task.name();
    let action = task.invoke();
    tokio::spawn(async move {
        if AssertUnwindSafe(action).catch_unwind().await.is_err() {
            error!(event = "core.scheduler.task_panicked", task = name);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_task(name: &'static str, interval_ms: u64) -> (PollTask, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let task = PollTask::new(name, Duration::from_millis(interval_ms), move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        (task, calls)
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_runs_immediately_then_periodically() {
        let scheduler = UpdateScheduler::new();
        let (task, calls) = counting_task(FRAME_TASK, 100);

        scheduler.start(vec![task]);
        tokio::time::sleep(ms(350)).await;

        // t=0 (immediate), 100, 200, 300
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert!(scheduler.is_running());
        assert_eq!(scheduler.live_timers(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_twice_keeps_one_timer_per_task() {
        let scheduler = UpdateScheduler::new();
        let (task, calls) = counting_task(FRAME_TASK, 100);

        scheduler.start(vec![task.clone()]);
        scheduler.start(vec![task]);
        assert_eq!(scheduler.live_timers(), 1);

        tokio::time::sleep(ms(1050)).await;
        // Two immediate invocations, then a single timer's ten ticks.
        assert_eq!(calls.load(Ordering::SeqCst), 12);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tasks_run_independently() {
        let scheduler = UpdateScheduler::new();
        let (frame, frame_calls) = counting_task(FRAME_TASK, 100);
        let (logs, logs_calls) = counting_task(LOGS_TASK, 2000);

        scheduler.start(vec![frame, logs]);
        tokio::time::sleep(ms(2050)).await;

        assert_eq!(frame_calls.load(Ordering::SeqCst), 21);
        assert_eq!(logs_calls.load(Ordering::SeqCst), 2);
        assert_eq!(scheduler.live_timers(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_pauses_everything() {
        let scheduler = UpdateScheduler::new();
        let (task, calls) = counting_task(FRAME_TASK, 100);

        scheduler.start(vec![task]);
        tokio::time::sleep(ms(150)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        scheduler.stop();
        tokio::time::sleep(Duration::from_secs(60)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(!scheduler.is_running());
        assert_eq!(scheduler.live_timers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_when_stopped_is_noop() {
        let scheduler = UpdateScheduler::new();
        scheduler.stop();
        scheduler.stop();
        assert!(!scheduler.is_running());
        assert_eq!(scheduler.live_timers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_rearms_registered_tasks() {
        let scheduler = UpdateScheduler::new();
        let (task, calls) = counting_task(FRAME_TASK, 100);

        scheduler.start(vec![task]);
        scheduler.stop();
        tokio::time::sleep(ms(500)).await;
        let before = calls.load(Ordering::SeqCst);

        assert!(scheduler.resume());
        tokio::time::sleep(ms(250)).await;
        // immediate + 100 + 200
        assert_eq!(calls.load(Ordering::SeqCst), before + 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_without_tasks() {
        let scheduler = UpdateScheduler::new();
        assert!(!scheduler.resume());
        assert!(!scheduler.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_applies_new_interval() {
        let scheduler = UpdateScheduler::new();
        let (task, calls) = counting_task(FRAME_TASK, 100);

        scheduler.start(vec![task.clone()]);
        scheduler.restart(vec![task.with_interval(ms(500))]);
        assert_eq!(scheduler.live_timers(), 1);
        assert_eq!(scheduler.interval_of(FRAME_TASK), Some(ms(500)));

        tokio::time::sleep(ms(1050)).await;
        // two immediate invocations, then ticks at 500 and 1000
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retime_running_task_waits_a_full_period() {
        let scheduler = UpdateScheduler::new();
        let (task, calls) = counting_task(FRAME_TASK, 100);

        scheduler.start(vec![task]);
        assert!(scheduler.retime(FRAME_TASK, ms(500)));

        tokio::time::sleep(ms(450)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(ms(600)).await;
        // ticks at 500 and 1000
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(scheduler.live_timers(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retime_while_stopped_defers_to_resume() {
        let scheduler = UpdateScheduler::new();
        let (task, calls) = counting_task(FRAME_TASK, 100);

        scheduler.start(vec![task]);
        scheduler.stop();

        assert!(!scheduler.retime(FRAME_TASK, ms(400)));
        assert_eq!(scheduler.live_timers(), 0);
        assert!(!scheduler.is_running());
        assert_eq!(scheduler.interval_of(FRAME_TASK), Some(ms(400)));

        tokio::time::sleep(ms(1000)).await;
        let before = calls.load(Ordering::SeqCst);

        scheduler.resume();
        tokio::time::sleep(ms(450)).await;
        // immediate + 400
        assert_eq!(calls.load(Ordering::SeqCst), before + 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retime_unknown_task() {
        let scheduler = UpdateScheduler::new();
        assert!(!scheduler.retime("missing", ms(100)));
        assert_eq!(scheduler.live_timers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_action_keeps_ticking() {
        let scheduler = UpdateScheduler::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let task = PollTask::new(FRAME_TASK, ms(100), move || {
            let counter = Arc::clone(&counter);
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    panic!("first poll blew up");
                }
            }
        });

        scheduler.start(vec![task]);
        tokio::time::sleep(ms(350)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(scheduler.live_timers(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_completion_after_stop_cannot_rearm() {
        let scheduler = Arc::new(UpdateScheduler::new());
        let completions = Arc::new(AtomicUsize::new(0));

        let handle = Arc::downgrade(&scheduler);
        let done = Arc::clone(&completions);
        let task = PollTask::new(FRAME_TASK, ms(100), move || {
            let handle = handle.clone();
            let done = Arc::clone(&done);
            async move {
                // Slow response, then a backoff-style retime from the handler.
                tokio::time::sleep(ms(300)).await;
                if let Some(scheduler) = handle.upgrade() {
                    scheduler.retime(FRAME_TASK, ms(150));
                }
                done.fetch_add(1, Ordering::SeqCst);
            }
        });

        scheduler.start(vec![task]);
        tokio::time::sleep(ms(10)).await;
        scheduler.stop();

        tokio::time::sleep(ms(1000)).await;
        assert_eq!(completions.load(Ordering::SeqCst), 1);
        assert!(!scheduler.is_running());
        assert_eq!(scheduler.live_timers(), 0);
        assert_eq!(scheduler.interval_of(FRAME_TASK), Some(ms(150)));
    }
}
