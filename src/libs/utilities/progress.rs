// Background "downloading ...." indicator.
// The reporter owns its own thread and is stopped through a one-shot channel.
// Dropping the reporter stops and joins the thread, so it never outlives the
// transfer it accompanies, whichever way the transfer ends.

use std::io::{self, Write};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// How often a marker is printed while a transfer is running.
pub const DEFAULT_TICK: Duration = Duration::from_secs(1);

/// Periodic progress ticks on a dedicated thread.
pub struct ProgressReporter {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl ProgressReporter {
    /// Starts printing `label` followed by a dot every `tick` to stderr.
    pub fn start(label: &str, tick: Duration) -> Self {
        Self::start_with_sink(label, tick, Box::new(io::stderr()))
    }

    /// Same as [`ProgressReporter::start`] but writing to an arbitrary sink.
    pub fn start_with_sink(label: &str, tick: Duration, mut sink: Box<dyn Write + Send>) -> Self {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let label = label.to_string();
        let handle = thread::spawn(move || {
            // Write failures on a progress line are not worth failing a download over.
            let _ = write!(sink, "{label} ");
            loop {
                let _ = write!(sink, ".");
                let _ = sink.flush();
                match stop_rx.recv_timeout(tick) {
                    Err(RecvTimeoutError::Timeout) => continue,
                    // Either an explicit stop or the owner went away.
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            let _ = writeln!(sink, " finished");
            let _ = sink.flush();
        });
        ProgressReporter {
            stop: Some(stop_tx),
            handle: Some(handle),
        }
    }

    /// Signals the thread and waits for it to print its completion marker.
    pub fn finish(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        if let Some(stop) = self.stop.take() {
            // The receiver only disappears if the thread already exited.
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}
