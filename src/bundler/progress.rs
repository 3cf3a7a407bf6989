//! Stage progress reporting.

use crate::bundler::error::{Result, Stage, StageExt};
use std::future::Future;

/// Receives stage transitions of a running build.
///
/// Implementations must be cheap; they run inline on the build task.
pub trait BuildObserver: Send + Sync {
    /// A stage is about to start.
    fn stage_started(&self, _stage: Stage) {}

    /// A stage completed successfully.
    fn stage_finished(&self, _stage: Stage) {}

    /// A stage failed; the error is returned to the caller right after.
    fn stage_failed(&self, _stage: Stage) {}
}

/// Observer that ignores every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl BuildObserver for NoopObserver {}

/// Runs one stage, notifying `observer` and tagging any error with `stage`.
pub async fn run_stage<T, F>(observer: &dyn BuildObserver, stage: Stage, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    log::info!("{}...", stage);
    observer.stage_started(stage);
    match fut.await.stage(stage) {
        Ok(value) => {
            observer.stage_finished(stage);
            Ok(value)
        }
        Err(e) => {
            log::debug!("stage failed: {}", e);
            observer.stage_failed(stage);
            Err(e)
        }
    }
}
