use pointgroups_core::{CancelToken, ConversionResult, ConvertConfig, ParseError, ProgressEvent};
use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryIter};
use std::thread::{self, JoinHandle};

use crate::pipeline::Converter;

/// A conversion running on its own thread.
///
/// Progress arrives on a one-way channel; the worker never waits for the
/// host to drain it.
pub struct ConversionHandle {
    events: Receiver<ProgressEvent>,
    cancel: CancelToken,
    thread: JoinHandle<Result<ConversionResult, ParseError>>,
}

/// Starts converting `base` on a dedicated worker thread.
pub fn spawn_conversion(base: PathBuf, config: ConvertConfig) -> ConversionHandle {
    let (tx, rx) = mpsc::channel();
    let cancel = CancelToken::new();
    let converter = Converter::new(config).with_cancel(cancel.clone());

    let thread = thread::spawn(move || {
        let mut sink = |fraction: f32, message: &str| {
            // A host that stopped listening is not an error.
            let _ = tx.send(ProgressEvent {
                fraction,
                message: message.to_string(),
            });
        };
        converter.convert_path(&base, &mut sink)
    });

    ConversionHandle {
        events: rx,
        cancel,
        thread,
    }
}

impl ConversionHandle {
    /// Blocking receiver, closed once the worker exits.
    pub fn events(&self) -> &Receiver<ProgressEvent> {
        &self.events
    }

    /// Events queued so far, without blocking.
    pub fn pending_events(&self) -> TryIter<'_, ProgressEvent> {
        self.events.try_iter()
    }

    /// Asks the worker to stop at the next record boundary.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    pub fn join(self) -> Result<ConversionResult, ParseError> {
        self.thread
            .join()
            .map_err(|_| ParseError::Io(io::Error::other("conversion worker panicked")))?
    }
}
