use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Receives fire-and-forget progress updates.
pub trait ProgressSink {
    fn report(&mut self, fraction: f32, message: &str);
}

impl<F> ProgressSink for F
where
    F: FnMut(f32, &str),
{
    fn report(&mut self, fraction: f32, message: &str) {
        self(fraction, message)
    }
}

/// Discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _fraction: f32, _message: &str) {}
}

/// Owned progress update, for sending across threads.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    pub fraction: f32,
    pub message: String,
}

/// Caller-side subsampling of per-record progress: roughly twenty events per
/// pass, plus one for the final record.
#[derive(Debug, Clone, Copy)]
pub struct ProgressThrottle {
    total: u32,
    step: u32,
}

impl ProgressThrottle {
    pub const EVENTS_PER_PASS: u32 = 20;

    pub fn new(total: u32) -> Self {
        let step = total.div_ceil(Self::EVENTS_PER_PASS).max(1);
        Self { total, step }
    }

    pub fn step(&self) -> u32 {
        self.step
    }

    pub fn should_report(&self, index: u32) -> bool {
        index % self.step == 0 || index + 1 == self.total
    }

    /// `index / (total - 1)`; a single-record pass is complete at its only record.
    pub fn fraction(&self, index: u32) -> f32 {
        if self.total <= 1 {
            1.0
        } else {
            index as f32 / (self.total - 1) as f32
        }
    }
}

/// Cooperative cancellation flag shared between a host and a running
/// conversion. Checked only between whole records.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
