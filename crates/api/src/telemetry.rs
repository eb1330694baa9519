//! Process-owned Prometheus registry.
//!
//! [`MetricsRegistry`] wraps a Prometheus recorder that is *not* installed as
//! the global `metrics` recorder. Everything recorded through it goes via
//! [`metrics::with_local_recorder`], so the registry is an ordinary value that
//! is created at startup and handed to whoever needs it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use metrics::{Label, Unit};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle, PrometheusRecorder};
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};
use tokio::task::JoinHandle;

/// Content type of the Prometheus text exposition format.
pub const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

pub const PROCESS_CPU_USAGE_PERCENT: &str = "process_cpu_usage_percent";
pub const PROCESS_RESIDENT_MEMORY_BYTES: &str = "process_resident_memory_bytes";
pub const PROCESS_VIRTUAL_MEMORY_BYTES: &str = "process_virtual_memory_bytes";
pub const PROCESS_START_TIME_SECONDS: &str = "process_start_time_seconds";
pub const PROCESS_UPTIME_SECONDS: &str = "process_uptime_seconds";

pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";

/// Shared, cheaply clonable handle to the service's metrics registry.
#[derive(Clone)]
pub struct MetricsRegistry {
    inner: Arc<Inner>,
}

struct Inner {
    recorder: PrometheusRecorder,
    handle: PrometheusHandle,
    defaults_registered: AtomicBool,
    sampler: Mutex<ProcessSampler>,
}

impl MetricsRegistry {
    /// Creates an empty registry. No process metrics are collected until
    /// [`register_defaults`](Self::register_defaults) is called.
    pub fn new() -> Self {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        let registry = Self {
            inner: Arc::new(Inner {
                recorder,
                handle,
                defaults_registered: AtomicBool::new(false),
                sampler: Mutex::new(ProcessSampler::new()),
            }),
        };
        registry.with_recorder(describe_http_metrics);
        registry
    }

    /// Registers the default process metrics and takes a first sample.
    ///
    /// Returns `true` the first time. Later calls leave the registry untouched
    /// and return `false`.
    pub fn register_defaults(&self) -> bool {
        if self.inner.defaults_registered.swap(true, Ordering::AcqRel) {
            tracing::debug!("default process metrics already registered");
            return false;
        }

        self.with_recorder(describe_process_metrics);
        self.sample_process();
        tracing::info!("default process metrics registered");
        true
    }

    /// Whether [`register_defaults`](Self::register_defaults) has run.
    pub fn defaults_registered(&self) -> bool {
        self.inner.defaults_registered.load(Ordering::Acquire)
    }

    /// Refreshes the process gauges. Does nothing before the defaults are
    /// registered.
    pub fn sample_process(&self) {
        if !self.defaults_registered() {
            return;
        }

        let snapshot = self
            .inner
            .sampler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .sample();

        match snapshot {
            Some(snapshot) => self.with_recorder(|| snapshot.record()),
            None => tracing::warn!("could not read metrics for the current process"),
        }
    }

    /// Records one handled HTTP request.
    pub fn record_request(&self, method: &str, path: &str, status: u16, elapsed: Duration) {
        let labels = vec![
            Label::new("method", method.to_owned()),
            Label::new("path", path.to_owned()),
            Label::new("status", status.to_string()),
        ];
        self.with_recorder(|| {
            metrics::counter!(HTTP_REQUESTS_TOTAL, labels.clone()).increment(1);
            metrics::histogram!(HTTP_REQUEST_DURATION_SECONDS, labels)
                .record(elapsed.as_secs_f64());
        });
    }

    /// Renders the registry in the Prometheus text exposition format.
    pub fn render(&self) -> String {
        self.inner.handle.render()
    }

    /// Spawns a task that refreshes process metrics every `period` and runs
    /// histogram upkeep. Abort the returned handle to stop it.
    pub fn spawn_sampler(&self, period: Duration) -> JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                registry.sample_process();
                registry.inner.handle.run_upkeep();
            }
        })
    }

    fn with_recorder<T>(&self, f: impl FnOnce() -> T) -> T {
        metrics::with_local_recorder(&self.inner.recorder, f)
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn describe_process_metrics() {
    metrics::describe_gauge!(
        PROCESS_CPU_USAGE_PERCENT,
        Unit::Percent,
        "CPU usage of the process (can exceed 100 on multi-core hosts)"
    );
    metrics::describe_gauge!(
        PROCESS_RESIDENT_MEMORY_BYTES,
        Unit::Bytes,
        "Resident memory size in bytes"
    );
    metrics::describe_gauge!(
        PROCESS_VIRTUAL_MEMORY_BYTES,
        Unit::Bytes,
        "Virtual memory size in bytes"
    );
    metrics::describe_gauge!(
        PROCESS_START_TIME_SECONDS,
        Unit::Seconds,
        "Start time of the process since unix epoch in seconds"
    );
    metrics::describe_gauge!(
        PROCESS_UPTIME_SECONDS,
        Unit::Seconds,
        "Seconds since the process started"
    );
}

fn describe_http_metrics() {
    metrics::describe_counter!(HTTP_REQUESTS_TOTAL, "Total number of HTTP requests handled");
    metrics::describe_histogram!(
        HTTP_REQUEST_DURATION_SECONDS,
        Unit::Seconds,
        "HTTP request latency in seconds"
    );
}

/// Point-in-time reading of this process.
#[derive(Debug, Clone, Copy)]
struct ProcessSnapshot {
    cpu_usage_percent: f32,
    resident_memory_bytes: u64,
    virtual_memory_bytes: u64,
    start_time_seconds: u64,
    uptime_seconds: u64,
}

impl ProcessSnapshot {
    fn record(&self) {
        metrics::gauge!(PROCESS_CPU_USAGE_PERCENT).set(f64::from(self.cpu_usage_percent));
        metrics::gauge!(PROCESS_RESIDENT_MEMORY_BYTES).set(self.resident_memory_bytes as f64);
        metrics::gauge!(PROCESS_VIRTUAL_MEMORY_BYTES).set(self.virtual_memory_bytes as f64);
        metrics::gauge!(PROCESS_START_TIME_SECONDS).set(self.start_time_seconds as f64);
        metrics::gauge!(PROCESS_UPTIME_SECONDS).set(self.uptime_seconds as f64);
    }
}

struct ProcessSampler {
    system: System,
    pid: Option<Pid>,
}

impl ProcessSampler {
    fn new() -> Self {
        Self {
            system: System::new(),
            pid: sysinfo::get_current_pid().ok(),
        }
    }

    fn sample(&mut self) -> Option<ProcessSnapshot> {
        let pid = self.pid?;
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing().with_cpu().with_memory(),
        );

        let process = self.system.process(pid)?;
        Some(ProcessSnapshot {
            cpu_usage_percent: process.cpu_usage(),
            resident_memory_bytes: process.memory(),
            virtual_memory_bytes: process.virtual_memory(),
            start_time_seconds: process.start_time(),
            uptime_seconds: process.run_time(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_type_lines(rendered: &str, name: &str) -> usize {
        let needle = format!("# TYPE {name} ");
        rendered.lines().filter(|l| l.starts_with(&needle)).count()
    }

    #[test]
    fn test_empty_before_registration() {
        let registry = MetricsRegistry::new();
        assert!(!registry.defaults_registered());
        assert!(!registry.render().contains(PROCESS_RESIDENT_MEMORY_BYTES));
    }

    #[test]
    fn test_register_defaults_exposes_process_metrics() {
        let registry = MetricsRegistry::new();
        assert!(registry.register_defaults());

        let rendered = registry.render();
        assert_eq!(count_type_lines(&rendered, PROCESS_RESIDENT_MEMORY_BYTES), 1);
        assert_eq!(count_type_lines(&rendered, PROCESS_VIRTUAL_MEMORY_BYTES), 1);
        assert!(rendered.contains(&format!("# HELP {PROCESS_RESIDENT_MEMORY_BYTES} ")));
    }

    #[test]
    fn test_register_defaults_is_idempotent() {
        let registry = MetricsRegistry::new();
        assert!(registry.register_defaults());
        assert!(!registry.register_defaults());
        assert!(!registry.register_defaults());

        let rendered = registry.render();
        assert_eq!(count_type_lines(&rendered, PROCESS_RESIDENT_MEMORY_BYTES), 1);
        let samples = rendered
            .lines()
            .filter(|l| l.starts_with(&format!("{PROCESS_RESIDENT_MEMORY_BYTES} ")))
            .count();
        assert_eq!(samples, 1);
    }

    #[test]
    fn test_registries_are_independent() {
        let first = MetricsRegistry::new();
        let second = MetricsRegistry::new();
        first.register_defaults();

        assert!(first.render().contains(PROCESS_RESIDENT_MEMORY_BYTES));
        assert!(!second.render().contains(PROCESS_RESIDENT_MEMORY_BYTES));
    }

    #[test]
    fn test_sample_before_registration_is_noop() {
        let registry = MetricsRegistry::new();
        registry.sample_process();
        assert!(!registry.render().contains(PROCESS_CPU_USAGE_PERCENT));
    }

    #[test]
    fn test_record_request() {
        let registry = MetricsRegistry::new();
        registry.record_request("GET", "/", 200, Duration::from_millis(3));
        registry.record_request("GET", "/", 200, Duration::from_millis(5));

        let rendered = registry.render();
        let line = rendered
            .lines()
            .find(|l| l.starts_with(HTTP_REQUESTS_TOTAL))
            .expect("request counter rendered");
        assert!(line.contains(r#"method="GET""#));
        assert!(line.contains(r#"path="/""#));
        assert!(line.contains(r#"status="200""#));
        assert!(line.ends_with(" 2"));
    }

    #[tokio::test]
    async fn test_sampler_task_can_be_aborted() {
        let registry = MetricsRegistry::new();
        registry.register_defaults();

        let handle = registry.spawn_sampler(Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(30)).await;
        handle.abort();

        assert!(handle.await.unwrap_err().is_cancelled());
        assert!(registry.render().contains(PROCESS_UPTIME_SECONDS));
    }
}
