// Attempt orchestration: fetch settings, cast the vote, report, pause.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{Instrument, info_span};

use crate::domain::errors::AttemptError;
use crate::domain::ports::{HandshakeGateway, ProgressLog, VoteConnector};
use crate::use_cases::cast_vote::CastVoteUseCase;
use crate::use_cases::delay::DelayRange;
use crate::use_cases::fetch_settings::FetchSettingsUseCase;

/// How many attempts `VoteRunner::run` makes. `None` repeats until shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatPolicy {
    pub attempts: Option<u32>,
}

impl RepeatPolicy {
    pub fn once() -> Self {
        Self { attempts: Some(1) }
    }

    pub fn unbounded() -> Self {
        Self { attempts: None }
    }

    fn allows(&self, completed: u32) -> bool {
        self.attempts.is_none_or(|limit| completed < limit)
    }
}

impl Default for RepeatPolicy {
    fn default() -> Self {
        Self::once()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub attempts: u32,
    pub successes: u32,
}

pub struct VoteRunner<G, C> {
    pub fetch_settings: FetchSettingsUseCase<G>,
    pub cast_vote: CastVoteUseCase<C>,
    pub delay: DelayRange,
    pub repeat: RepeatPolicy,
    pub log: Arc<dyn ProgressLog>,
}

impl<G, C> VoteRunner<G, C>
where
    G: HandshakeGateway,
    C: VoteConnector,
{
    /// One full attempt with its typed failure.
    pub async fn attempt(&self) -> Result<(), AttemptError> {
        let credentials = self.fetch_settings.execute().await?;
        self.cast_vote.execute(&credentials).await?;
        Ok(())
    }

    /// One full attempt, reduced to success or failure. Never panics or aborts.
    pub async fn vote(&self) -> bool {
        match self.attempt().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, kind = ?e.kind(), "vote attempt failed");
                self.log.append_line(&format!("Vote failed: {e}"));
                false
            }
        }
    }

    /// Runs attempts until the repeat policy is exhausted or `shutdown` turns true.
    /// Every attempt is followed by a randomized pause.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> RunSummary {
        let mut summary = RunSummary::default();

        while self.repeat.allows(summary.attempts) && !*shutdown.borrow() {
            // Counter only advances on success, so a failure reuses the next vote number.
            let counter = summary.successes + 1;
            let span = info_span!("attempt", attempt = summary.attempts + 1, counter);
            let success = self.vote().instrument(span).await;

            summary.attempts += 1;
            if success {
                summary.successes += 1;
                self.log.append_line(&format!("Vote {counter} successful"));
            } else {
                self.log.append_line(&format!("Vote {counter} failed"));
            }

            let wait = self.delay.sample(&mut rand::thread_rng());
            self.log
                .append_line(&format!("Waiting for {} seconds...", wait.as_secs_f64()));
            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = wait_for_shutdown(&mut shutdown) => {
                    tracing::info!("shutdown requested; stopping vote loop");
                    break;
                }
            }
        }

        tracing::info!(
            attempts = summary.attempts,
            successes = summary.successes,
            "vote run finished"
        );
        summary
    }
}

// Resolves once the flag is set. A dropped sender means no signal will ever arrive.
async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
