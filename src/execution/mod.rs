//! Execution engine for running masking pipelines with configurable parallelism.
//!
//! This module sits "above" [`crate::processing`] and provides:
//!
//! - Parallel (chunked) transformation of a [`DataSet`] on a dedicated rayon pool
//! - Resource limits / throttling (in-flight chunks)
//! - Cooperative cancellation and a per-row error policy
//! - Real-time metrics + observer hooks for monitoring
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use rust_data_masking::config::TransformerConfig;
//! use rust_data_masking::execution::{
//!     CancellationToken, ExecutionEngine, ExecutionOptions, LoggingExecutionObserver,
//! };
//! use rust_data_masking::transformers::TransformerRegistry;
//! use rust_data_masking::types::{Column, DataSet, Oid, Record, Schema};
//!
//! let schema = Schema::new(vec![Column::new(0, "n", "int8", Oid::INT8, 8)]);
//! let rows = (0..100).map(|i| Record::from_text([Some(i.to_string())])).collect();
//! let ds = DataSet::new(schema.clone(), rows);
//!
//! let registry = TransformerRegistry::with_builtin().unwrap();
//! let config = TransformerConfig::new("DeterministicInteger")
//!     .with_param("column", "n")
//!     .with_param("min", "0")
//!     .with_param("max", "9")
//!     .with_salt("00ff");
//! let (t, _) = registry.instantiate(&config, &schema).unwrap();
//!
//! let engine = ExecutionEngine::new(ExecutionOptions {
//!     num_threads: Some(2),
//!     chunk_size: 16,
//!     ..ExecutionOptions::default()
//! })
//! .unwrap()
//! .with_observer(Arc::new(LoggingExecutionObserver));
//!
//! let out = engine.transform_parallel(&ds, &mut [t], &CancellationToken::new()).unwrap();
//! assert_eq!(out.row_count(), 100);
//! assert_eq!(engine.metrics().snapshot().rows_processed, 100);
//! ```

mod observer;
mod semaphore;

use std::ops::Range;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use rayon::ThreadPool;
use rayon::ThreadPoolBuilder;

use crate::error::{MaskingError, MaskingResult};
use crate::processing::pipeline::{finish, init_all};
use crate::processing::{check_affected_columns, transform_record};
use crate::transformers::Transformer;
use crate::types::{DataSet, Record};

pub use crate::processing::CancellationToken;
pub use observer::{
    ExecutionEvent, ExecutionMetrics, ExecutionMetricsSnapshot, ExecutionObserver, LoggingExecutionObserver,
};

use semaphore::Semaphore;

/// What to do when a transformer fails on a row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RowErrorPolicy {
    /// Stop the run and return the error.
    #[default]
    Abort,
    /// Emit the original row unmodified, report [`ExecutionEvent::RowFailed`] and continue.
    KeepOriginal,
}

/// Configuration for the [`ExecutionEngine`].
#[derive(Debug, Clone)]
pub struct ExecutionOptions {
    /// Number of worker threads used by the engine.
    ///
    /// If `None`, uses the platform's available parallelism.
    pub num_threads: Option<usize>,
    /// Number of rows per chunk.
    ///
    /// Chunking lets the engine bound working-set size and implement throttling.
    pub chunk_size: usize,
    /// Upper bound on concurrently executing chunks.
    ///
    /// This is an additional throttle on top of `num_threads`.
    pub max_in_flight_chunks: usize,
    pub on_row_error: RowErrorPolicy,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        let n = available_parallelism();
        Self {
            num_threads: Some(n),
            chunk_size: 4_096,
            max_in_flight_chunks: n,
            on_row_error: RowErrorPolicy::default(),
        }
    }
}

/// A configurable execution engine for masking in-memory [`DataSet`]s.
pub struct ExecutionEngine {
    pool: ThreadPool,
    opts: ExecutionOptions,
    observer: Option<Arc<dyn ExecutionObserver>>,
    metrics: Arc<ExecutionMetrics>,
}

impl ExecutionEngine {
    /// Create a new engine with the given options.
    ///
    /// Fails if `chunk_size == 0`, `max_in_flight_chunks == 0`, `num_threads == Some(0)`, or the
    /// thread pool cannot be built.
    pub fn new(opts: ExecutionOptions) -> MaskingResult<Self> {
        if opts.chunk_size == 0 {
            return Err(MaskingError::Execution("chunk_size must be > 0".to_string()));
        }
        if opts.max_in_flight_chunks == 0 {
            return Err(MaskingError::Execution(
                "max_in_flight_chunks must be > 0".to_string(),
            ));
        }
        if opts.num_threads == Some(0) {
            return Err(MaskingError::Execution(
                "num_threads must be > 0 when set".to_string(),
            ));
        }

        let n_threads = opts.num_threads.unwrap_or_else(available_parallelism);
        let pool = ThreadPoolBuilder::new()
            .num_threads(n_threads)
            .build()
            .map_err(|e| MaskingError::Execution(format!("failed to build rayon thread pool: {e}")))?;

        Ok(Self {
            pool,
            opts,
            observer: None,
            metrics: Arc::new(ExecutionMetrics::new()),
        })
    }

    /// Attach an observer for execution events (metrics/logging).
    pub fn with_observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Get a handle to real-time execution metrics.
    pub fn metrics(&self) -> Arc<ExecutionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Returns a masked copy of `dataset`, processing chunks of rows in parallel.
    ///
    /// Transformers are checked for affected-column conflicts, then `init` is called on each, rows
    /// are transformed in pipeline order, and `done` is called on each initialized transformer even
    /// if a later `init` or the run fails.
    /// Output rows keep the input order.
    pub fn transform_parallel(
        &self,
        dataset: &DataSet,
        transformers: &mut [Box<dyn Transformer>],
        cancel: &CancellationToken,
    ) -> MaskingResult<DataSet> {
        check_affected_columns(transformers)?;
        init_all(transformers)?;

        let shared: &[Box<dyn Transformer>] = &*transformers;
        let out = self
            .pool
            .install(|| self.transform_parallel_impl(dataset, shared, cancel));
        let finished = finish(transformers);

        let out = out?;
        finished?;
        Ok(out)
    }

    fn transform_parallel_impl(
        &self,
        dataset: &DataSet,
        transformers: &[Box<dyn Transformer>],
        cancel: &CancellationToken,
    ) -> MaskingResult<DataSet> {
        let start = Instant::now();
        self.metrics.begin_run();
        self.emit(ExecutionEvent::RunStarted {
            rows: dataset.row_count(),
            transformers: transformers.len(),
        });

        let sem = Semaphore::new(self.opts.max_in_flight_chunks);
        let chunk_ranges = chunk_ranges(dataset.row_count(), self.opts.chunk_size);

        let per_chunk: MaskingResult<Vec<Vec<Record>>> = chunk_ranges
            .into_par_iter()
            .map(|range| {
                let (_permit, waited) = sem.acquire_guard();
                if waited > Duration::ZERO {
                    self.metrics.on_throttle_wait(waited);
                    self.emit(ExecutionEvent::ThrottleWaited { duration: waited });
                }

                self.metrics.on_chunk_start();
                self.emit(ExecutionEvent::ChunkStarted {
                    start_row: range.start,
                    row_count: range.len(),
                });

                let out = self.transform_chunk(dataset, range, transformers, cancel);

                self.emit(ExecutionEvent::ChunkFinished {
                    output_rows: out.as_ref().map_or(0, Vec::len),
                });
                self.metrics.on_chunk_end();
                out
            })
            .collect();

        self.metrics.end_run(start.elapsed());
        self.emit(ExecutionEvent::RunFinished {
            elapsed: start.elapsed(),
            metrics: self.metrics.snapshot(),
        });

        let rows = per_chunk?.into_iter().flatten().collect();
        Ok(DataSet::new(dataset.schema.clone(), rows))
    }

    fn transform_chunk(
        &self,
        dataset: &DataSet,
        range: Range<usize>,
        transformers: &[Box<dyn Transformer>],
        cancel: &CancellationToken,
    ) -> MaskingResult<Vec<Record>> {
        let mut out = Vec::with_capacity(range.len());
        for row in range {
            if cancel.is_cancelled() {
                return Err(MaskingError::Cancelled { row });
            }
            let original = &dataset.rows[row];
            self.metrics.on_row_processed();
            match transform_record(row, original, transformers) {
                Ok(masked) => out.push(masked),
                Err(err) if self.opts.on_row_error == RowErrorPolicy::KeepOriginal => {
                    self.metrics.on_row_failed();
                    let (transformer, message) = match &err {
                        MaskingError::Transform {
                            transformer, source, ..
                        } => (transformer.clone(), source.to_string()),
                        other => (String::new(), other.to_string()),
                    };
                    self.emit(ExecutionEvent::RowFailed {
                        row,
                        transformer,
                        message,
                    });
                    out.push(original.clone());
                }
                Err(err) => return Err(err),
            }
        }
        Ok(out)
    }

    fn emit(&self, event: ExecutionEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}

fn available_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn chunk_ranges(row_count: usize, chunk_size: usize) -> Vec<Range<usize>> {
    if row_count == 0 {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(row_count.div_ceil(chunk_size));
    let mut start = 0usize;
    while start < row_count {
        let end = (start + chunk_size).min(row_count);
        out.push(start..end);
        start = end;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{chunk_ranges, CancellationToken, ExecutionEngine, ExecutionOptions, RowErrorPolicy};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use crate::error::{MaskingError, MaskingResult};
    use crate::execution::{ExecutionEvent, ExecutionObserver};
    use crate::transformers::{AffectedColumns, Transformer};
    use crate::types::{Column, DataSet, Oid, RawValue, Record, Schema};

    fn dataset_of_n(n: usize) -> DataSet {
        let schema = Schema::new(vec![Column::new(0, "id", "int8", Oid::INT8, 8)]);
        let rows = (0..n).map(|i| Record::from_text([Some(i.to_string())])).collect();
        DataSet::new(schema, rows)
    }

    fn opts(threads: usize, in_flight: usize) -> ExecutionOptions {
        ExecutionOptions {
            num_threads: Some(threads),
            chunk_size: 1,
            max_in_flight_chunks: in_flight,
            on_row_error: RowErrorPolicy::Abort,
        }
    }

    /// Adds one to column 0, sleeping to make chunk overlap observable. Fails on `fail_on`.
    struct Increment {
        affected: AffectedColumns,
        sleep: Duration,
        fail_on: Option<i64>,
    }

    impl Increment {
        fn boxed(sleep: Duration, fail_on: Option<i64>) -> Box<dyn Transformer> {
            Box::new(Self {
                affected: AffectedColumns::from([(0, "id".to_string())]),
                sleep,
                fail_on,
            })
        }
    }

    impl Transformer for Increment {
        fn name(&self) -> &str {
            "Increment"
        }

        fn affected_columns(&self) -> &AffectedColumns {
            &self.affected
        }

        fn transform(&self, record: &mut Record) -> MaskingResult<()> {
            std::thread::sleep(self.sleep);
            let v: i64 = record
                .get_raw_column_value_by_idx(0)?
                .as_text()
                .and_then(|t| t.parse().ok())
                .ok_or_else(|| MaskingError::parameter("id", "not an integer"))?;
            if Some(v) == self.fail_on {
                return Err(MaskingError::Generator(format!("refusing {v}")));
            }
            record.set_raw_column_value_by_idx(0, RawValue::text((v + 1).to_string()))
        }
    }

    /// Counts `done` calls; optionally fails in `init`.
    struct Lifecycle {
        affected: AffectedColumns,
        fail_init: bool,
        dones: Arc<AtomicUsize>,
    }

    impl Transformer for Lifecycle {
        fn name(&self) -> &str {
            "Lifecycle"
        }

        fn affected_columns(&self) -> &AffectedColumns {
            &self.affected
        }

        fn init(&mut self) -> MaskingResult<()> {
            if self.fail_init {
                return Err(MaskingError::Execution("init failed".to_string()));
            }
            Ok(())
        }

        fn transform(&self, _record: &mut Record) -> MaskingResult<()> {
            Ok(())
        }

        fn done(&mut self) -> MaskingResult<()> {
            self.dones.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn chunk_ranges_cover_rows_without_gaps() {
        assert!(chunk_ranges(0, 4).is_empty());
        assert_eq!(chunk_ranges(10, 4), vec![0..4, 4..8, 8..10]);
        assert_eq!(chunk_ranges(3, 5), vec![0..3]);
    }

    #[test]
    fn invalid_options_are_rejected() {
        let mut o = opts(2, 2);
        o.chunk_size = 0;
        assert!(matches!(ExecutionEngine::new(o), Err(MaskingError::Execution(_))));
        assert!(matches!(ExecutionEngine::new(opts(0, 1)), Err(MaskingError::Execution(_))));
        assert!(matches!(ExecutionEngine::new(opts(1, 0)), Err(MaskingError::Execution(_))));
    }

    #[test]
    fn transform_parallel_preserves_row_order() {
        let ds = dataset_of_n(200);
        let engine = ExecutionEngine::new(opts(4, 4)).unwrap();
        let mut ts = vec![Increment::boxed(Duration::ZERO, None)];

        let out = engine
            .transform_parallel(&ds, &mut ts, &CancellationToken::new())
            .unwrap();

        let expected: Vec<Option<String>> = (1..=200).map(|i| Some(i.to_string())).collect();
        assert_eq!(out.column_text("id").unwrap(), expected);
    }

    struct ConcurrencyObserver {
        active_chunks: AtomicUsize,
        max_active_chunks: AtomicUsize,
        failed_rows: Mutex<Vec<usize>>,
    }

    impl ConcurrencyObserver {
        fn new() -> Self {
            Self {
                active_chunks: AtomicUsize::new(0),
                max_active_chunks: AtomicUsize::new(0),
                failed_rows: Mutex::new(Vec::new()),
            }
        }
        fn max(&self) -> usize {
            self.max_active_chunks.load(Ordering::SeqCst)
        }
    }

    impl ExecutionObserver for ConcurrencyObserver {
        fn on_event(&self, event: &ExecutionEvent) {
            match event {
                ExecutionEvent::ChunkStarted { .. } => {
                    let now = self.active_chunks.fetch_add(1, Ordering::SeqCst) + 1;
                    self.max_active_chunks.fetch_max(now, Ordering::SeqCst);
                }
                ExecutionEvent::ChunkFinished { .. } => {
                    let _ = self.active_chunks.fetch_sub(1, Ordering::SeqCst);
                }
                ExecutionEvent::RowFailed { row, .. } => {
                    self.failed_rows.lock().unwrap().push(*row);
                }
                _ => {}
            }
        }
    }

    #[test]
    fn max_in_flight_chunks_throttles_chunk_concurrency() {
        let ds = dataset_of_n(100);
        let observer = Arc::new(ConcurrencyObserver::new());
        let obs_trait: Arc<dyn ExecutionObserver> = observer.clone();
        let engine = ExecutionEngine::new(opts(4, 1)).unwrap().with_observer(obs_trait);
        let mut ts = vec![Increment::boxed(Duration::from_millis(1), None)];

        let out = engine
            .transform_parallel(&ds, &mut ts, &CancellationToken::new())
            .unwrap();

        assert_eq!(out.row_count(), ds.row_count());
        assert_eq!(observer.max(), 1);
    }

    #[test]
    fn metrics_are_available_after_run() {
        let ds = dataset_of_n(60);
        let engine = ExecutionEngine::new(opts(4, 1)).unwrap();
        let metrics = engine.metrics();
        let mut ts = vec![Increment::boxed(Duration::from_millis(2), None)];

        let out = engine
            .transform_parallel(&ds, &mut ts, &CancellationToken::new())
            .unwrap();
        assert_eq!(out.row_count(), ds.row_count());

        let snap = metrics.snapshot();
        assert_eq!(snap.rows_processed, ds.row_count() as u64);
        assert_eq!(snap.rows_failed, 0);
        assert_eq!(snap.chunks_started, ds.row_count() as u64);
        assert_eq!(snap.chunks_finished, ds.row_count() as u64);
        assert_eq!(snap.max_active_chunks, 1);
        assert!(snap.throttle_wait > Duration::ZERO);
        assert!(snap.elapsed.is_some());
    }

    #[test]
    fn abort_policy_returns_the_row_error() {
        let ds = dataset_of_n(20);
        let engine = ExecutionEngine::new(opts(2, 2)).unwrap();
        let mut ts = vec![Increment::boxed(Duration::ZERO, Some(13))];

        let err = engine
            .transform_parallel(&ds, &mut ts, &CancellationToken::new())
            .unwrap_err();
        match err {
            MaskingError::Transform { transformer, row, .. } => {
                assert_eq!(transformer, "Increment");
                assert_eq!(row, 13);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn keep_original_policy_emits_failed_rows_unchanged() {
        let ds = dataset_of_n(20);
        let observer = Arc::new(ConcurrencyObserver::new());
        let obs_trait: Arc<dyn ExecutionObserver> = observer.clone();
        let mut o = opts(2, 2);
        o.on_row_error = RowErrorPolicy::KeepOriginal;
        let engine = ExecutionEngine::new(o).unwrap().with_observer(obs_trait);
        let mut ts = vec![Increment::boxed(Duration::ZERO, Some(13))];

        let out = engine
            .transform_parallel(&ds, &mut ts, &CancellationToken::new())
            .unwrap();

        let ids = out.column_text("id").unwrap();
        assert_eq!(ids[13], Some("13".to_string()));
        assert_eq!(ids[12], Some("13".to_string()));
        assert_eq!(ids[14], Some("15".to_string()));
        assert_eq!(*observer.failed_rows.lock().unwrap(), vec![13]);
        assert_eq!(engine.metrics().snapshot().rows_failed, 1);
    }

    #[test]
    fn cancelled_run_returns_cancelled() {
        let ds = dataset_of_n(50);
        let engine = ExecutionEngine::new(opts(2, 2)).unwrap();
        let mut ts = vec![Increment::boxed(Duration::ZERO, None)];
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = engine.transform_parallel(&ds, &mut ts, &cancel).unwrap_err();
        assert!(matches!(err, MaskingError::Cancelled { .. }));
        assert_eq!(engine.metrics().snapshot().rows_processed, 0);
    }

    #[test]
    fn failed_init_calls_done_on_earlier_transformers_only() {
        let ds = dataset_of_n(10);
        let engine = ExecutionEngine::new(opts(2, 2)).unwrap();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let mut ts: Vec<Box<dyn Transformer>> = vec![
            Box::new(Lifecycle {
                affected: AffectedColumns::from([(0, "id".to_string())]),
                fail_init: false,
                dones: Arc::clone(&first),
            }),
            Box::new(Lifecycle {
                affected: AffectedColumns::from([(1, "extra".to_string())]),
                fail_init: true,
                dones: Arc::clone(&second),
            }),
        ];

        let err = engine
            .transform_parallel(&ds, &mut ts, &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(err, MaskingError::Execution(_)));
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);
        assert_eq!(engine.metrics().snapshot().rows_processed, 0);
    }

    #[test]
    fn conflicting_transformers_are_rejected() {
        let ds = dataset_of_n(5);
        let engine = ExecutionEngine::new(opts(2, 2)).unwrap();
        let mut ts = vec![
            Increment::boxed(Duration::ZERO, None),
            Increment::boxed(Duration::ZERO, None),
        ];
        let err = engine
            .transform_parallel(&ds, &mut ts, &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(err, MaskingError::AffectedColumnConflict { .. }));
    }
}
