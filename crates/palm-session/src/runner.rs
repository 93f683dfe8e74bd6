//! Concurrent detection over the pending attachments of a session.

use crate::attachment::{load_image, LoadError, LoadOutcome};
use crate::Session;
use palm_detect::Detector;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

pub type SharedDetector = Arc<dyn Detector + Send + Sync>;

type Job = (String, Result<LoadOutcome, LoadError>);

/// Decode, detect and analyse every attachment that needs it, at most
/// `workers` at a time. Results are applied to `session` in completion
/// order. Returns how many attachments were processed.
pub async fn analyze_pending(session: &mut Session, detector: SharedDetector, workers: usize) -> usize {
    let mut jobs: Vec<(String, PathBuf)> = Vec::new();
    for id in session.pending() {
        if !session.begin_load(&id) {
            continue;
        }
        if let Some(attachment) = session.attachment(&id) {
            let path = attachment.path().to_path_buf();
            jobs.push((id, path));
        }
    }

    if jobs.is_empty() {
        return 0;
    }
    log::info!("Analysing {} images with {} workers", jobs.len(), workers.max(1));

    let permits = Arc::new(Semaphore::new(workers.max(1)));
    let mut set: JoinSet<Job> = JoinSet::new();
    let outstanding: HashSet<String> = jobs.iter().map(|(id, _)| id.clone()).collect();

    for (id, path) in jobs {
        let permits = Arc::clone(&permits);
        let detector = Arc::clone(&detector);
        set.spawn(async move {
            let _permit = permits.acquire_owned().await;
            let name = id.clone();
            let outcome = tokio::task::spawn_blocking(move || load_image(&path, &name, &*detector))
                .await
                .unwrap_or_else(|e| Err(LoadError::Worker(e.to_string())));
            (id, outcome)
        });
    }

    apply_results(session, &mut set, outstanding).await
}

/// Drain `set` into `session`. Ids whose task never reported back (aborted
/// or panicked outside the blocking section) are failed as worker errors so
/// the next pass retries them.
async fn apply_results(session: &mut Session, set: &mut JoinSet<Job>, mut outstanding: HashSet<String>) -> usize {
    let mut done = 0;
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((id, outcome)) => {
                outstanding.remove(&id);
                log_outcome(&id, &outcome);
                session.apply(&id, outcome);
                done += 1;
            }
            Err(e) => log::error!("detection task aborted: {e}"),
        }
    }

    for id in outstanding {
        session.apply(&id, Err(LoadError::Worker("detection task did not complete".to_string())));
        done += 1;
    }
    done
}

fn log_outcome(id: &str, outcome: &Result<LoadOutcome, LoadError>) {
    if let Ok(outcome) = outcome {
        log::info!(
            "{id}: {} ({} trees, {:?})",
            outcome.analysis.plant_condition(),
            outcome.analysis.tree_count(),
            outcome.finished.elapsed
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DetectionStatus, ImageAttachment};

    #[tokio::test]
    async fn aborted_task_fails_its_attachment() {
        let mut session = Session::new();
        session.set_selection(vec![ImageAttachment::new("a.png")]);
        assert!(session.begin_load("a.png"));

        let mut set: JoinSet<Job> = JoinSet::new();
        set.spawn(std::future::pending::<Job>()).abort();
        let outstanding = HashSet::from(["a.png".to_string()]);

        assert_eq!(apply_results(&mut session, &mut set, outstanding).await, 1);

        let attachment = session.attachment("a.png").unwrap();
        match attachment.status() {
            Some(DetectionStatus::Failed(err)) => assert!(matches!(**err, LoadError::Worker(_))),
            other => panic!("unexpected status {other:?}"),
        }
        assert!(attachment.needs_load());
    }
}
