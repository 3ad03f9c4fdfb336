//! Debounced session autosave
//!
//! The registry owner serializes a snapshot and hands the text to a worker
//! thread. Requests arriving within the delay window collapse into one write
//! of the latest snapshot. The worker never touches the registry itself.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use crate::session::write_atomic;

/// Outcome of one write, reported back to the owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveReport {
    Saved { path: PathBuf, bytes: usize },
    /// Message to show the user; the snapshot is retried on the next request
    Failed(String),
}

#[derive(Debug)]
enum Message {
    Save(String),
    Flush,
    Shutdown,
}

pub struct Autosave {
    sender: Sender<Message>,
    reports: Receiver<SaveReport>,
    handle: Option<thread::JoinHandle<()>>,
}

impl Autosave {
    /// Start the worker writing to `path`
    pub fn spawn(path: &Path, delay: Duration) -> Result<Self> {
        let (sender, receiver) = mpsc::channel();
        let (report_tx, reports) = mpsc::channel();
        let path = path.to_path_buf();
        let handle = thread::Builder::new()
            .name("xset-autosave".to_string())
            .spawn(move || {
                info!(path = %path.display(), delay_ms = delay.as_millis() as u64, "Autosave worker started");
                run_worker(&path, delay, &receiver, &report_tx);
                debug!("Autosave worker stopped");
            })
            .context("Failed to spawn autosave thread")?;
        Ok(Self {
            sender,
            reports,
            handle: Some(handle),
        })
    }

    /// Queue a serialized snapshot for saving
    pub fn request(&self, text: String) {
        if self.sender.send(Message::Save(text)).is_err() {
            error!("Autosave worker is gone, request dropped");
        }
    }

    /// Write any pending snapshot now
    pub fn flush(&self) {
        if self.sender.send(Message::Flush).is_err() {
            error!("Autosave worker is gone, flush dropped");
        }
    }

    /// Next report, if one is ready
    pub fn poll(&self) -> Option<SaveReport> {
        self.reports.try_recv().ok()
    }

    /// Wait up to `timeout` for the next report
    pub fn wait_report(&self, timeout: Duration) -> Option<SaveReport> {
        self.reports.recv_timeout(timeout).ok()
    }
}

impl Drop for Autosave {
    fn drop(&mut self) {
        let _ = self.sender.send(Message::Shutdown);
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            error!("Autosave worker panicked");
        }
    }
}

fn run_worker(path: &Path, delay: Duration, receiver: &Receiver<Message>, reports: &Sender<SaveReport>) {
    let mut pending: Option<String> = None;
    let mut deadline: Option<Instant> = None;

    loop {
        let message = match deadline {
            Some(at) => receiver.recv_timeout(at.saturating_duration_since(Instant::now())),
            None => receiver.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };
        match message {
            Ok(Message::Save(text)) => {
                if deadline.is_none() {
                    deadline = Some(Instant::now() + delay);
                }
                pending = Some(text);
            }
            Ok(Message::Flush) | Err(RecvTimeoutError::Timeout) => {
                deadline = None;
                if let Some(text) = pending.take() {
                    save(path, &text, reports);
                }
            }
            Ok(Message::Shutdown) | Err(RecvTimeoutError::Disconnected) => {
                if let Some(text) = pending.take() {
                    save(path, &text, reports);
                }
                break;
            }
        }
    }
}

fn save(path: &Path, text: &str, reports: &Sender<SaveReport>) {
    let report = match write_atomic(path, text) {
        Ok(()) => {
            info!(path = %path.display(), bytes = text.len(), "Autosaved session");
            SaveReport::Saved {
                path: path.to_path_buf(),
                bytes: text.len(),
            }
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "Autosave failed");
            SaveReport::Failed(format!("Failed to save {}: {e:#}", path.display()))
        }
    };
    let _ = reports.send(report);
}
