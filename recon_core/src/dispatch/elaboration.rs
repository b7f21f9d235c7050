//! Injected collaborators for the dispatcher.
//!
//! [`Elaborator`] adds free-form prose after a calculation; [`ExcerptSource`]
//! supplies excerpts from earlier reports. Neither is ever on the path to
//! the numeric result: the elaborator runs on its own thread under a
//! timeout and any failure just drops the elaboration.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::RecvTimeoutError;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::rules::CalculationFamily;
use crate::calculations::CalculationResult;

/// What the elaborator gets to see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElaborationContext {
    pub query: String,
    pub family: CalculationFamily,
    pub result: CalculationResult,
    /// The deterministic explanation already produced
    pub interpretation: String,
}

/// Optional prose generator (e.g. a language model behind an HTTP API).
///
/// Returning `None` means "nothing to add".
pub trait Elaborator: Send + Sync {
    fn elaborate(&self, context: &ElaborationContext) -> Option<String>;
}

/// Source of opaque excerpts from earlier reports.
pub trait ExcerptSource: Send + Sync {
    fn excerpts(&self, family: CalculationFamily, result: &CalculationResult) -> Vec<String>;
}

/// Run the elaborator with a timeout.
///
/// The call runs on a detached thread; on timeout the thread is left to
/// finish on its own and its answer is discarded.
pub fn elaborate_with_timeout(
    elaborator: &Arc<dyn Elaborator>,
    context: ElaborationContext,
    timeout: Duration,
) -> Option<String> {
    // One slot: the worker never blocks on send, even after a timeout
    let (tx, rx) = crossbeam_channel::bounded(1);
    let worker = Arc::clone(elaborator);

    let spawned = thread::Builder::new()
        .name("recon-elaboration".to_string())
        .spawn(move || {
            let text = worker.elaborate(&context);
            // Receiver may have given up already
            let _ = tx.send(text);
        });
    if let Err(e) = spawned {
        warn!(error = %e, "could not start elaboration thread");
        return None;
    }

    match rx.recv_timeout(timeout) {
        Ok(Some(text)) if !text.trim().is_empty() => Some(text),
        Ok(_) => {
            debug!("elaborator had nothing to add");
            None
        }
        Err(RecvTimeoutError::Timeout) => {
            warn!(timeout_ms = timeout.as_millis() as u64, "elaboration timed out");
            None
        }
        Err(RecvTimeoutError::Disconnected) => {
            warn!("elaboration failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::CalculationKind;
    use crate::formulas::Formula;

    struct Fixed(&'static str);
    impl Elaborator for Fixed {
        fn elaborate(&self, _: &ElaborationContext) -> Option<String> {
            Some(self.0.to_string())
        }
    }

    struct Slow;
    impl Elaborator for Slow {
        fn elaborate(&self, _: &ElaborationContext) -> Option<String> {
            thread::sleep(Duration::from_millis(500));
            Some("too late".to_string())
        }
    }

    struct Panics;
    impl Elaborator for Panics {
        fn elaborate(&self, _: &ElaborationContext) -> Option<String> {
            panic!("backend unavailable");
        }
    }

    fn context() -> ElaborationContext {
        ElaborationContext {
            query: "energia".to_string(),
            family: CalculationFamily::KineticEnergy,
            result: CalculationResult::new(CalculationKind::KineticEnergy, Formula::KineticEnergy),
            interpretation: String::new(),
        }
    }

    fn run(elaborator: impl Elaborator + 'static, timeout_ms: u64) -> Option<String> {
        let elaborator: Arc<dyn Elaborator> = Arc::new(elaborator);
        elaborate_with_timeout(&elaborator, context(), Duration::from_millis(timeout_ms))
    }

    #[test]
    fn test_returns_text() {
        assert_eq!(run(Fixed("contexto"), 1_000).as_deref(), Some("contexto"));
    }

    #[test]
    fn test_blank_text_dropped() {
        assert_eq!(run(Fixed("   "), 1_000), None);
    }

    #[test]
    fn test_timeout_drops_text() {
        assert_eq!(run(Slow, 20), None);
    }

    #[test]
    fn test_late_answer_is_discarded() {
        assert_eq!(run(Slow, 20), None);
        // Worker finishes into a channel nobody reads
        thread::sleep(Duration::from_millis(600));
        assert_eq!(run(Fixed("depois"), 1_000).as_deref(), Some("depois"));
    }

    #[test]
    fn test_panic_drops_text() {
        assert_eq!(run(Panics, 1_000), None);
    }
}
