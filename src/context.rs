//! Compute context for parallel raster work.
//!
//! A [`ComputeContext`] owns the worker pool that tiling and pyramid
//! construction run on. Most callers use the lazily created process-wide
//! context from [`init_context`]; code that wants explicit ownership can
//! build one with [`ComputeContext::new`] and pass it around instead.

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::ComputeConfig;
use crate::error::{MusaError, Result};

static CONTEXT: OnceCell<ComputeContext> = OnceCell::new();

/// Number of times the global context has been constructed
static CONSTRUCTIONS: AtomicUsize = AtomicUsize::new(0);

/// Serializable summary of a context
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ContextInfo {
    pub id: String,
    pub app_name: String,
    pub master: String,
    pub workers: usize,
    pub ui_enabled: bool,
    pub started_at: String,
}

/// Handle to a local parallel execution session
#[derive(Debug)]
pub struct ComputeContext {
    id: Uuid,
    config: ComputeConfig,
    workers: usize,
    started_at: DateTime<Utc>,
    pool: ThreadPool,
}

impl ComputeContext {
    /// Build a new context from the given configuration
    pub fn new(config: &ComputeConfig) -> Result<Self> {
        let workers = parse_master(&config.master)?.unwrap_or_else(num_cpus);

        let app_name = config.app_name.clone();
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(move |i| format!("{}-worker-{}", app_name, i))
            .build()
            .map_err(|e| MusaError::Context {
                message: format!("Failed to build worker pool: {}", e),
            })?;

        let context = Self {
            id: Uuid::new_v4(),
            config: config.clone(),
            workers,
            started_at: Utc::now(),
            pool,
        };

        info!(
            app_name = %context.config.app_name,
            master = %context.config.master,
            workers = workers,
            ui_enabled = context.config.ui_enabled,
            context_id = %context.id,
            "Compute context created"
        );

        Ok(context)
    }

    /// Run `op` inside the context's worker pool
    pub fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(op)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn app_name(&self) -> &str {
        &self.config.app_name
    }

    pub fn master(&self) -> &str {
        &self.config.master
    }

    /// Number of worker threads in the pool
    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn ui_enabled(&self) -> bool {
        self.config.ui_enabled
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn config(&self) -> &ComputeConfig {
        &self.config
    }

    pub fn info(&self) -> ContextInfo {
        ContextInfo {
            id: self.id.to_string(),
            app_name: self.config.app_name.clone(),
            master: self.config.master.clone(),
            workers: self.workers,
            ui_enabled: self.config.ui_enabled,
            started_at: self.started_at.to_rfc3339(),
        }
    }
}

/// Parse a master string into a worker count.
///
/// `local` means a single worker, `local[*]` one worker per CPU (returned as
/// `None`), and `local[N]` exactly `N` workers.
pub fn parse_master(master: &str) -> Result<Option<usize>> {
    let invalid = || MusaError::Config {
        message: format!(
            "Invalid master: {}. Must be one of: local, local[*], local[N]",
            master
        ),
    };

    if master == "local" {
        return Ok(Some(1));
    }

    let inner = master
        .strip_prefix("local[")
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(invalid)?;

    if inner == "*" {
        return Ok(None);
    }

    match inner.parse::<usize>() {
        Ok(n) if n > 0 => Ok(Some(n)),
        _ => Err(invalid()),
    }
}

fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Get the process-wide context, creating it with default settings on first use
pub fn init_context() -> Result<&'static ComputeContext> {
    init_context_with(&ComputeConfig::default())
}

/// Get the process-wide context, creating it from `config` on first use.
///
/// Once a context exists it is returned as is, even if `config` differs.
pub fn init_context_with(config: &ComputeConfig) -> Result<&'static ComputeContext> {
    if let Some(context) = CONTEXT.get() {
        if context.config() != config {
            warn!(
                requested_master = %config.master,
                active_master = %context.master(),
                "Compute context already initialized; ignoring new configuration"
            );
        }
        return Ok(context);
    }

    CONTEXT.get_or_try_init(|| {
        CONSTRUCTIONS.fetch_add(1, Ordering::SeqCst);
        ComputeContext::new(config)
    })
}

/// The process-wide context, if it has been created
pub fn global_context() -> Option<&'static ComputeContext> {
    CONTEXT.get()
}

/// How many times the process-wide context has been constructed
pub fn constructions() -> usize {
    CONSTRUCTIONS.load(Ordering::SeqCst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_master() {
        assert_eq!(parse_master("local").unwrap(), Some(1));
        assert_eq!(parse_master("local[*]").unwrap(), None);
        assert_eq!(parse_master("local[4]").unwrap(), Some(4));

        assert!(parse_master("local[0]").is_err());
        assert!(parse_master("local[x]").is_err());
        assert!(parse_master("spark://host:7077").is_err());
        assert!(parse_master("").is_err());
    }

    #[test]
    fn test_init_context_is_idempotent() {
        let first = init_context().unwrap();
        let count = constructions();
        let second = init_context().unwrap();

        assert_eq!(count, 1);
        assert_eq!(constructions(), 1);
        assert_eq!(first.id(), second.id());
        assert!(std::ptr::eq(first, second));
        assert!(global_context().is_some_and(|c| std::ptr::eq(c, first)));
    }

    #[test]
    fn test_concurrent_first_use_constructs_once() {
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| init_context().map(|c| c.id()).unwrap()))
            .collect();
        let ids: Vec<Uuid> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert!(ids.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(constructions(), 1);
    }

    #[test]
    fn test_explicit_context() {
        let config = ComputeConfig {
            app_name: "explicit".to_string(),
            master: "local[2]".to_string(),
            ui_enabled: false,
        };
        let context = ComputeContext::new(&config).unwrap();

        assert_eq!(context.workers(), 2);
        assert_eq!(context.app_name(), "explicit");
        assert!(!context.ui_enabled());
        assert_eq!(context.install(rayon::current_num_threads), 2);

        let info = context.info();
        assert_eq!(info.id, context.id().to_string());
        assert_eq!(info.master, "local[2]");
        assert_eq!(info.workers, 2);
    }

    #[test]
    fn test_invalid_master_fails() {
        let config = ComputeConfig {
            master: "mesos".to_string(),
            ..Default::default()
        };
        assert!(ComputeContext::new(&config).is_err());
    }
}
