use std::sync::mpsc::{self, Receiver};
use std::thread::JoinHandle;

use crate::config::JobConfig;
use crate::foundation::error::{TypewaveError, TypewaveResult};
use crate::render::driver::{JobInput, JobOutcome, Progress, render_job};

/// A render job running on a background thread.
///
/// Only progress updates and the final result cross the thread boundary.
#[derive(Debug)]
pub struct RenderHandle {
    progress: Receiver<Progress>,
    handle: JoinHandle<TypewaveResult<JobOutcome>>,
}

impl RenderHandle {
    /// Progress updates in frame order; disconnects when the job ends.
    pub fn progress(&self) -> &Receiver<Progress> {
        &self.progress
    }

    /// Most recent progress update, if any arrived since the last call.
    pub fn latest_progress(&self) -> Option<Progress> {
        self.progress.try_iter().last()
    }

    /// Whether the job has stopped (successfully or not).
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until the job ends and return its result.
    pub fn join(self) -> TypewaveResult<JobOutcome> {
        self.handle
            .join()
            .map_err(|_| TypewaveError::Other(anyhow::anyhow!("render thread panicked")))?
    }
}

/// Start `render_job(config, input)` on a named background thread.
pub fn spawn_render(config: JobConfig, input: JobInput) -> TypewaveResult<RenderHandle> {
    let (tx, rx) = mpsc::channel();
    let handle = std::thread::Builder::new()
        .name("typewave-render".to_owned())
        .spawn(move || {
            // A dropped receiver only means nobody is watching.
            render_job(&config, &input, &mut |p| {
                let _ = tx.send(p);
            })
        })
        .map_err(|e| TypewaveError::Other(anyhow::anyhow!("spawn render thread: {e}")))?;

    Ok(RenderHandle {
        progress: rx,
        handle,
    })
}
