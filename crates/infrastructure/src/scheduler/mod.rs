//! Scheduler for the recurring ingest cycle
//!
//! A task fires either on a fixed interval or on a six-field cron expression.
//! A fire that starts later than the task's misfire grace period is skipped
//! and counted, never queued for later.
//!
//! Timing comes from `tokio-cron-scheduler`; this module adds misfire
//! detection, per-task counters and a completion event channel.

mod misfire;

use std::{
    collections::HashMap,
    future::Future,
    pin::Pin,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use thiserror::Error;
use tokio::sync::{Mutex as AsyncMutex, mpsc};
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

pub use misfire::{Trigger, cron_fired_within, interval_lateness, parse_cron};

/// Scheduler errors
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Invalid cron expression
    #[error("Invalid cron expression: {0}")]
    InvalidCronExpression(String),

    /// Invalid interval or grace period
    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    /// A task with this name already exists
    #[error("Task already exists: {0}")]
    DuplicateTask(String),

    /// Internal scheduler error
    #[error("Internal scheduler error: {0}")]
    Internal(String),
}

impl From<JobSchedulerError> for SchedulerError {
    fn from(err: JobSchedulerError) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Counters for one task
#[derive(Debug, Clone)]
pub struct TaskStats {
    /// Task name
    pub name: String,
    /// When the task fires
    pub trigger: Trigger,
    /// Fires that ran and returned `Ok`
    pub success_count: u64,
    /// Fires that ran and returned `Err`
    pub failure_count: u64,
    /// Fires skipped as misfires
    pub skipped_count: u64,
    /// Completion time of the last run
    pub last_run: Option<DateTime<Utc>>,
    /// Error of the last failed run
    pub last_error: Option<String>,
    /// Mean run duration in milliseconds
    pub avg_duration_ms: u64,
}

#[derive(Debug)]
struct TaskCounters {
    name: String,
    trigger: Trigger,
    success: AtomicU64,
    failure: AtomicU64,
    skipped: AtomicU64,
    total_duration_ms: AtomicU64,
    last_run: RwLock<Option<DateTime<Utc>>>,
    last_error: RwLock<Option<String>>,
}

impl TaskCounters {
    fn new(name: &str, trigger: Trigger) -> Self {
        Self {
            name: name.to_string(),
            trigger,
            success: AtomicU64::new(0),
            failure: AtomicU64::new(0),
            skipped: AtomicU64::new(0),
            total_duration_ms: AtomicU64::new(0),
            last_run: RwLock::new(None),
            last_error: RwLock::new(None),
        }
    }

    fn record_run(&self, result: &Result<(), String>, duration_ms: u64) {
        match result {
            Ok(()) => self.success.fetch_add(1, Ordering::Relaxed),
            Err(e) => {
                *self.last_error.write() = Some(e.clone());
                self.failure.fetch_add(1, Ordering::Relaxed)
            },
        };
        self.total_duration_ms
            .fetch_add(duration_ms, Ordering::Relaxed);
        *self.last_run.write() = Some(Utc::now());
    }

    fn snapshot(&self) -> TaskStats {
        let success_count = self.success.load(Ordering::Relaxed);
        let failure_count = self.failure.load(Ordering::Relaxed);
        let runs = success_count + failure_count;
        TaskStats {
            name: self.name.clone(),
            trigger: self.trigger.clone(),
            success_count,
            failure_count,
            skipped_count: self.skipped.load(Ordering::Relaxed),
            last_run: *self.last_run.read(),
            last_error: self.last_error.read().clone(),
            avg_duration_ms: self
                .total_duration_ms
                .load(Ordering::Relaxed)
                .checked_div(runs)
                .unwrap_or(0),
        }
    }
}

/// Outcome of a single fire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The task ran and returned `Ok`
    Succeeded,
    /// The task ran and returned `Err`
    Failed,
    /// The fire was later than the grace period and did not run
    Skipped,
}

/// Completion event sent to the event channel
#[derive(Debug, Clone)]
pub struct TaskEvent {
    /// Task name
    pub task_name: String,
    /// What happened
    pub outcome: TaskOutcome,
    /// Error message if failed
    pub error: Option<String>,
    /// Execution duration in milliseconds
    pub duration_ms: u64,
    /// When the fire finished
    pub completed_at: DateTime<Utc>,
}

/// Scheduler configuration
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Whether to start the scheduler immediately
    pub auto_start: bool,
    /// Task event buffer size
    pub event_buffer_size: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            auto_start: true,
            event_buffer_size: 100,
        }
    }
}

type JobFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Runs registered tasks on their triggers
pub struct TaskScheduler {
    scheduler: AsyncMutex<JobScheduler>,
    tasks: Arc<RwLock<HashMap<String, Arc<TaskCounters>>>>,
    running: AtomicBool,
    event_tx: mpsc::Sender<TaskEvent>,
    event_rx: Mutex<Option<mpsc::Receiver<TaskEvent>>>,
}

impl std::fmt::Debug for TaskScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskScheduler")
            .field("running", &self.running.load(Ordering::Relaxed))
            .field("tasks", &self.tasks.read().len())
            .finish_non_exhaustive()
    }
}

impl TaskScheduler {
    /// Create a new task scheduler
    #[instrument(skip_all)]
    pub async fn new(config: SchedulerConfig) -> Result<Self, SchedulerError> {
        let (event_tx, event_rx) = mpsc::channel(config.event_buffer_size);
        let instance = Self {
            scheduler: AsyncMutex::new(JobScheduler::new().await?),
            tasks: Arc::new(RwLock::new(HashMap::new())),
            running: AtomicBool::new(false),
            event_tx,
            event_rx: Mutex::new(Some(event_rx)),
        };

        if config.auto_start {
            instance.start().await?;
        }
        Ok(instance)
    }

    /// Start firing registered tasks
    pub async fn start(&self) -> Result<(), SchedulerError> {
        if self.running.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.scheduler.lock().await.start().await?;
        info!("Task scheduler started");
        Ok(())
    }

    /// Stop the scheduler; in-flight runs are not awaited
    pub async fn stop(&self) -> Result<(), SchedulerError> {
        if !self.running.swap(false, Ordering::AcqRel) {
            return Ok(());
        }
        self.scheduler.lock().await.shutdown().await?;
        info!("Task scheduler stopped");
        Ok(())
    }

    /// Take the event receiver (can only be called once)
    pub fn take_event_receiver(&self) -> Option<mpsc::Receiver<TaskEvent>> {
        self.event_rx.lock().take()
    }

    /// Add a task that fires every `every`, starting one interval from now
    pub async fn add_interval_task<F, Fut>(
        &self,
        name: &str,
        every: Duration,
        misfire_grace: Duration,
        task: F,
    ) -> Result<(), SchedulerError>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), String>> + Send + 'static,
    {
        if every.is_zero() {
            return Err(SchedulerError::InvalidInterval("interval must be > 0".into()));
        }
        self.add_task(name, Trigger::Interval { every }, misfire_grace, task)
            .await
    }

    /// Add a task on a six-field cron expression
    ///
    /// ```text
    /// sec min hour day-of-month month day-of-week (0-6, Sunday=0)
    /// ```
    pub async fn add_cron_task<F, Fut>(
        &self,
        name: &str,
        expression: &str,
        misfire_grace: Duration,
        task: F,
    ) -> Result<(), SchedulerError>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), String>> + Send + 'static,
    {
        let schedule = parse_cron(expression)
            .map_err(|e| SchedulerError::InvalidCronExpression(format!("{expression}: {e}")))?;
        let trigger = Trigger::Cron {
            expression: expression.to_string(),
            schedule: Box::new(schedule),
        };
        self.add_task(name, trigger, misfire_grace, task).await
    }

    #[instrument(skip(self, trigger, task), fields(trigger = %trigger))]
    async fn add_task<F, Fut>(
        &self,
        name: &str,
        trigger: Trigger,
        misfire_grace: Duration,
        task: F,
    ) -> Result<(), SchedulerError>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), String>> + Send + 'static,
    {
        if misfire_grace.is_zero() {
            return Err(SchedulerError::InvalidInterval(
                "misfire grace must be > 0".into(),
            ));
        }
        if self.tasks.read().contains_key(name) {
            return Err(SchedulerError::DuplicateTask(name.to_string()));
        }

        let counters = Arc::new(TaskCounters::new(name, trigger.clone()));
        let run = Self::job_body(
            Arc::clone(&counters),
            self.event_tx.clone(),
            misfire_grace,
            Arc::new(task),
        );

        let job = match &trigger {
            Trigger::Interval { every } => Job::new_repeated_async(*every, run)
                .map_err(|e| SchedulerError::InvalidInterval(e.to_string()))?,
            Trigger::Cron { expression, .. } => Job::new_async(expression.as_str(), run)
                .map_err(|e| SchedulerError::InvalidCronExpression(e.to_string()))?,
        };

        self.scheduler.lock().await.add(job).await?;
        self.tasks.write().insert(name.to_string(), counters);
        info!(task = %name, "Task scheduled");
        Ok(())
    }

    /// Build the closure the job runner calls on every fire
    fn job_body<F, Fut>(
        counters: Arc<TaskCounters>,
        event_tx: mpsc::Sender<TaskEvent>,
        misfire_grace: Duration,
        task: Arc<F>,
    ) -> impl FnMut(Uuid, JobScheduler) -> JobFuture + Send + Sync + 'static
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), String>> + Send + 'static,
    {
        let last_fire = Arc::new(Mutex::new(Utc::now()));

        move |_id, _scheduler| {
            let counters = Arc::clone(&counters);
            let event_tx = event_tx.clone();
            let task = Arc::clone(&task);
            let last_fire = Arc::clone(&last_fire);

            Box::pin(async move {
                let started_at = Utc::now();
                let previous = std::mem::replace(&mut *last_fire.lock(), started_at);

                if counters.trigger.is_misfire(previous, started_at, misfire_grace) {
                    counters.skipped.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        task = %counters.name,
                        grace_secs = misfire_grace.as_secs(),
                        "Misfire, skipping run"
                    );
                    let _ = event_tx.try_send(TaskEvent {
                        task_name: counters.name.clone(),
                        outcome: TaskOutcome::Skipped,
                        error: None,
                        duration_ms: 0,
                        completed_at: started_at,
                    });
                    return;
                }

                debug!(task = %counters.name, "Starting scheduled task");
                let start = Instant::now();
                let result = task().await;
                let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                counters.record_run(&result, duration_ms);

                let (outcome, error) = match result {
                    Ok(()) => {
                        info!(task = %counters.name, duration_ms, "Task completed");
                        (TaskOutcome::Succeeded, None)
                    },
                    Err(e) => {
                        error!(task = %counters.name, error = %e, duration_ms, "Task failed");
                        (TaskOutcome::Failed, Some(e))
                    },
                };
                let _ = event_tx.try_send(TaskEvent {
                    task_name: counters.name.clone(),
                    outcome,
                    error,
                    duration_ms,
                    completed_at: Utc::now(),
                });
            }) as JobFuture
        }
    }

    /// Counters for one task
    pub fn get_task_stats(&self, name: &str) -> Option<TaskStats> {
        self.tasks.read().get(name).map(|c| c.snapshot())
    }
}
