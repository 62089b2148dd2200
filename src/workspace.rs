//! src/workspace.rs
//! The per-run scratch directory and the guarantee that it never outlives the process.
//!
//! The directory lives in a shared slot so that both the normal drop path and the
//! signal listener release it through the same idempotent `release()` call. Whoever
//! takes the `TempDir` out of the slot first removes it while still holding the lock;
//! later callers wait for that removal and then find the slot empty.

use anyhow::Context;
use colored::*;
use signal_hook::consts::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::Signals;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use tempfile::TempDir;

const TERMINATION_SIGNALS: [i32; 4] = [SIGINT, SIGTERM, SIGHUP, SIGQUIT];

type Slot = Arc<Mutex<Option<TempDir>>>;

fn lock(slot: &Slot) -> MutexGuard<'_, Option<TempDir>> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// The guard is held until the directory is gone, so a concurrent caller
/// (the signal listener) blocks until removal has finished.
fn release(slot: &Slot) {
    let mut guard = lock(slot);
    if let Some(dir) = guard.take() {
        let path = dir.path().to_path_buf();
        if let Err(e) = dir.close() {
            eprintln!("{} could not remove {}: {}", "Warning:".yellow(), path.display(), e);
        }
    }
}

/// Scratch directory owned by a single run.
pub struct Workspace {
    slot: Slot,
    path: PathBuf,
    package: PathBuf,
}

impl Workspace {
    /// Creates a uniquely named directory under the system temp dir and copies `package` into it.
    pub fn create(package: &Path) -> anyhow::Result<Self> {
        Self::create_in(&std::env::temp_dir(), package)
    }

    pub fn create_in(parent: &Path, package: &Path) -> anyhow::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("stacher2appimage-")
            .tempdir_in(parent)
            .with_context(|| format!("creating workspace under {}", parent.display()))?;
        let path = dir.path().to_path_buf();
        let mut ws = Workspace { slot: Arc::new(Mutex::new(Some(dir))), path, package: PathBuf::new() };
        ws.release_on_signal();

        let file_name = package
            .file_name()
            .with_context(|| format!("input package path {} has no file name", package.display()))?;
        let copied = ws.path.join(file_name);
        fs::copy(package, &copied)
            .with_context(|| format!("copying {} into workspace", package.display()))?;

        ws.package = copied;
        Ok(ws)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The workspace's own copy of the input package.
    pub fn package(&self) -> &Path {
        &self.package
    }

    pub fn join<P: AsRef<Path>>(&self, rel: P) -> PathBuf {
        self.path.join(rel)
    }

    /// Removes the directory now. Safe to call more than once.
    pub fn release(&self) {
        release(&self.slot);
    }

    fn release_on_signal(&self) {
        let mut signals = match Signals::new(TERMINATION_SIGNALS) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("{} failed to register signal handlers: {}", "Warning:".yellow(), e);
                return;
            }
        };
        let slot = Arc::clone(&self.slot);
        thread::spawn(move || {
            if let Some(signal) = signals.forever().next() {
                release(&slot);
                // A user interrupt, so no bug-report line even though 128+N is not a known code.
                eprintln!("\n{} interrupted by signal {}, workspace removed.", "Error:".red().bold(), signal);
                std::process::exit(128 + signal);
            }
        });
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        self.release();
    }
}
