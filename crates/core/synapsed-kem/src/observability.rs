//! Observability for KEM operations
//!
//! Counts key generations, encapsulations and decapsulations, tracks the
//! running mean duration, and mirrors every event to `tracing`. Events
//! carry shapes and timings only, never matrix entries or secret bytes.

use parking_lot::RwLock;
use std::time::{Duration, Instant};

/// KEM operation events
#[derive(Debug, Clone)]
pub enum KemEvent {
    /// Key generation completed
    KeyGenCompleted {
        /// Matrix dimension
        n: usize,
        /// Elapsed time
        duration: Duration,
    },
    /// Encapsulation completed
    EncapsulationCompleted {
        /// Matrix dimension
        n: usize,
        /// Elapsed time
        duration: Duration,
    },
    /// Decapsulation completed
    DecapsulationCompleted {
        /// Matrix dimension
        n: usize,
        /// Elapsed time
        duration: Duration,
    },
    /// An operation failed
    ErrorOccurred {
        /// Operation name
        operation: String,
        /// Error description
        error: String,
    },
}

/// KEM performance metrics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KemMetrics {
    /// Total operations recorded, including failures
    pub total_operations: u64,
    /// Failed operations
    pub failed_operations: u64,
    /// Mean duration of successful operations
    pub avg_duration_ms: f64,
    /// Key generations performed
    pub key_generations: u64,
    /// Encapsulations performed
    pub encapsulations: u64,
    /// Decapsulations performed
    pub decapsulations: u64,
}

// Counters and the running-mean denominator move together under one lock
#[derive(Debug, Default)]
struct MetricsState {
    metrics: KemMetrics,
    timed_operations: u64,
}

impl MetricsState {
    fn update_avg_duration(&mut self, duration: &Duration) {
        self.timed_operations += 1;
        let new_duration_ms = duration.as_secs_f64() * 1000.0;
        self.metrics.avg_duration_ms +=
            (new_duration_ms - self.metrics.avg_duration_ms) / self.timed_operations as f64;
    }
}

/// Observability context for KEM operations
#[derive(Debug)]
pub struct KemObservability {
    component: String,
    state: RwLock<MetricsState>,
}

impl KemObservability {
    /// Create a new observability context
    pub fn new(component: &str) -> Self {
        Self {
            component: component.to_string(),
            state: RwLock::new(MetricsState::default()),
        }
    }

    /// Component name used in log events
    pub fn component(&self) -> &str {
        &self.component
    }

    /// Record a KEM event
    pub fn record_operation(&self, event: KemEvent) {
        {
            let mut state = self.state.write();
            state.metrics.total_operations += 1;

            match &event {
                KemEvent::KeyGenCompleted { duration, .. } => {
                    state.metrics.key_generations += 1;
                    state.update_avg_duration(duration);
                }
                KemEvent::EncapsulationCompleted { duration, .. } => {
                    state.metrics.encapsulations += 1;
                    state.update_avg_duration(duration);
                }
                KemEvent::DecapsulationCompleted { duration, .. } => {
                    state.metrics.decapsulations += 1;
                    state.update_avg_duration(duration);
                }
                KemEvent::ErrorOccurred { .. } => {
                    state.metrics.failed_operations += 1;
                }
            }
        }

        match event {
            KemEvent::ErrorOccurred { operation, error } => {
                tracing::error!(component = %self.component, %operation, %error, "KEM operation failed");
            }
            other => {
                tracing::trace!(component = %self.component, event = ?other, "KEM event");
            }
        }
    }

    /// Start timing an operation
    pub fn start_operation(&self, operation: &str) -> OperationTimer<'_> {
        OperationTimer {
            operation: operation.to_string(),
            start: Instant::now(),
            observability: self,
        }
    }

    /// Get current metrics
    pub fn get_metrics(&self) -> KemMetrics {
        self.state.read().metrics.clone()
    }
}

impl Default for KemObservability {
    fn default() -> Self {
        Self::new("kem")
    }
}

/// Timer for measuring operation duration
#[derive(Debug)]
pub struct OperationTimer<'a> {
    operation: String,
    start: Instant,
    observability: &'a KemObservability,
}

impl<'a> OperationTimer<'a> {
    /// Complete the operation successfully
    pub fn complete(self, event_type: impl FnOnce(Duration) -> KemEvent) {
        let duration = self.start.elapsed();
        self.observability.record_operation(event_type(duration));
    }

    /// Mark the operation as failed
    pub fn failed(self, error: String) {
        self.observability.record_operation(KemEvent::ErrorOccurred {
            operation: self.operation,
            error,
        });
    }
}
