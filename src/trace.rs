//! Tracing infrastructure for step-by-step inspection of a run.
//!
//! When the `trace` feature is enabled, key driver events are written to a
//! `TraceWriter` attached with `QuadBound::with_tracer`. Each event is one
//! tagged line:
//! ```text
//! TRACE INIT lb=<x> flb=<f> ub=<x> fub=<f> xmid=<x> qmid=<q>
//! TRACE EVAL iter=<n> pos=<p> x=<x> f=<f> g=<g>
//! TRACE INSERT side=<left|right> pos=<p> x=<x> q=<q>
//! TRACE SCAN iter=<n> lowbound=<l> upbound=<u> next=<p> size=<n>
//! TRACE DIVERGE iter=<n> x=<x>
//! TRACE END iter=<n> code=<code> lowbound=<l> upbound=<u>
//! ```
//! All values are in the driver's internal minimize form.

use std::fmt::Write as FmtWrite;
use std::sync::{Mutex, MutexGuard};

/// A thread-safe buffer that collects trace lines.
pub struct TraceWriter {
    buffer: Mutex<String>,
}

impl TraceWriter {
    pub fn new() -> Self {
        Self {
            buffer: Mutex::new(String::with_capacity(16 * 1024)),
        }
    }

    // A panic while holding the lock leaves only a partial line behind.
    fn lock(&self) -> MutexGuard<'_, String> {
        self.buffer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Write a trace line using format args.
    pub fn write_fmt(&self, args: std::fmt::Arguments<'_>) {
        let mut buf = self.lock();
        let _ = buf.write_fmt(args);
        buf.push('\n');
    }

    /// Get trace output as a vector of lines.
    pub fn get_lines(&self) -> Vec<String> {
        self.lock().lines().map(|s| s.to_string()).collect()
    }
}

impl Default for TraceWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Conditional trace output (only active with the `trace` feature).
#[cfg(feature = "trace")]
#[macro_export]
macro_rules! trace_write {
    ($tracer:expr, $($arg:tt)*) => {
        if let Some(ref tw) = $tracer {
            tw.write_fmt(format_args!($($arg)*));
        }
    };
}

/// No-op when the `trace` feature is disabled.
#[cfg(not(feature = "trace"))]
#[macro_export]
macro_rules! trace_write {
    ($tracer:expr, $($arg:tt)*) => {};
}
