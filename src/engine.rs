use anyhow::{anyhow, Result};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::context::ContextStore;
use crate::domain::TransactionPayload;
use crate::render::{BusySurface, RenderFanout};
use crate::scoring::ScoreBackend;
use crate::tracker::RequestTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzeOutcome {
    /// Result was the freshest and reached the context store and surfaces.
    Applied,
    /// A newer request was issued before this one completed; result dropped.
    Stale,
}

/// Entry point for every submission, manual or chaos-driven.
pub struct Engine {
    scoring: Arc<dyn ScoreBackend>,
    tracker: RequestTracker,
    context: Arc<ContextStore>,
    fanout: RenderFanout,
    busy: Option<Arc<dyn BusySurface>>,
    commit_lock: Mutex<()>,
}

impl Engine {
    pub fn new(
        scoring: Arc<dyn ScoreBackend>,
        context: Arc<ContextStore>,
        fanout: RenderFanout,
    ) -> Self {
        Self {
            scoring,
            tracker: RequestTracker::new(),
            context,
            fanout,
            busy: None,
            commit_lock: Mutex::new(()),
        }
    }

    pub fn with_busy(mut self, surface: Arc<dyn BusySurface>) -> Self {
        self.busy = Some(surface);
        self
    }

    pub fn outstanding(&self) -> u64 {
        self.tracker.outstanding()
    }

    /// issue -> track -> score -> freshness check -> commit.
    ///
    /// Failures are terminal for the submission: no partial render, no
    /// context update, only busy bookkeeping. A stale success is discarded
    /// the same way, minus the error.
    pub async fn analyze(&self, payload: TransactionPayload) -> Result<AnalyzeOutcome> {
        // Local validation failure: the request is never issued, so the
        // busy indicator and the outstanding count stay untouched.
        payload.validate()?;

        self.set_busy(true);
        let handle = self.tracker.begin();
        info!(
            amount = payload.amount,
            merchant = %payload.merchant,
            location = %payload.location,
            "engine.analyze"
        );

        let result = match self.scoring.predict(&payload).await {
            Ok(result) => result,
            Err(err) => {
                self.complete();
                return Err(err);
            }
        };

        // A compliant backend already turns an `error` field into a failure;
        // enforce it here too so the contract holds for any backend.
        if let Some(message) = &result.error {
            self.complete();
            return Err(anyhow!("scoring backend error: {message}"));
        }

        // Commit section. The freshness check and the writes it guards run
        // under one lock so a stale completion can never interleave its
        // writes with a fresher one.
        {
            let _commit = self.commit_lock.lock().await;
            if !self.tracker.is_current(handle) {
                drop(_commit);
                self.complete();
                debug!(score = result.risk_score, "engine.stale_discard");
                return Ok(AnalyzeOutcome::Stale);
            }
            self.context
                .set(result.risk_score, result.risk_factors.clone())
                .await;
            self.fanout.apply(&result, &payload);
        }

        self.complete();
        info!(
            score = result.risk_score,
            fraud = result.is_fraud,
            "engine.applied"
        );
        Ok(AnalyzeOutcome::Applied)
    }

    fn set_busy(&self, busy: bool) {
        if let Some(surface) = &self.busy {
            surface.set_busy(busy);
        }
    }

    /// Busy tracks "any request outstanding": it clears only when the last
    /// in-flight request finishes, applied, stale and failed alike.
    fn complete(&self) {
        if self.tracker.finish() == 0 {
            self.set_busy(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AnalysisResult;
    use crate::render::{VerdictSurface, VerdictView};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;
    use tokio::sync::{mpsc, oneshot};

    fn payload(amount: f64) -> TransactionPayload {
        TransactionPayload::new(amount, "Acme", "local", "2026-08-06", "12:00", Some("visa".into()))
    }

    fn ok_result(score: u8, is_fraud: bool) -> AnalysisResult {
        AnalysisResult {
            is_fraud,
            risk_score: score,
            risk_factors: vec![],
            location_data: None,
            details: None,
            ml_score: None,
            error: None,
        }
    }

    /// Backend whose completions the test releases one by one.
    struct GatedBackend {
        entered: mpsc::UnboundedSender<()>,
        scripts: StdMutex<VecDeque<(oneshot::Receiver<()>, Result<AnalysisResult>)>>,
    }

    impl GatedBackend {
        fn new(
            entered: mpsc::UnboundedSender<()>,
            scripts: Vec<(oneshot::Receiver<()>, Result<AnalysisResult>)>,
        ) -> Self {
            Self {
                entered,
                scripts: StdMutex::new(scripts.into()),
            }
        }
    }

    #[async_trait]
    impl ScoreBackend for GatedBackend {
        async fn predict(&self, _payload: &TransactionPayload) -> Result<AnalysisResult> {
            let (gate, result) = self
                .scripts
                .lock()
                .unwrap()
                .pop_front()
                .expect("unscripted predict call");
            let _ = self.entered.send(());
            let _ = gate.await;
            result
        }
    }

    #[derive(Default)]
    struct RecordingBusy {
        history: StdMutex<Vec<bool>>,
    }

    impl BusySurface for RecordingBusy {
        fn set_busy(&self, busy: bool) {
            self.history.lock().unwrap().push(busy);
        }
    }

    #[derive(Default)]
    struct RecordingVerdict {
        scores: StdMutex<Vec<u8>>,
        factors: StdMutex<Vec<Vec<String>>>,
    }

    impl VerdictSurface for RecordingVerdict {
        fn show_verdict(&self, view: &VerdictView) {
            self.scores.lock().unwrap().push(view.score);
            self.factors.lock().unwrap().push(view.factors.clone());
        }
        fn set_progress(&self, _value: u8) {}
    }

    struct Fixture {
        engine: Arc<Engine>,
        context: Arc<ContextStore>,
        busy: Arc<RecordingBusy>,
        verdict: Arc<RecordingVerdict>,
        entered: mpsc::UnboundedReceiver<()>,
    }

    fn fixture(scripts: Vec<(oneshot::Receiver<()>, Result<AnalysisResult>)>) -> Fixture {
        let (entered_tx, entered) = mpsc::unbounded_channel();
        let backend = Arc::new(GatedBackend::new(entered_tx, scripts));
        let context = Arc::new(ContextStore::new());
        let busy = Arc::new(RecordingBusy::default());
        let verdict = Arc::new(RecordingVerdict::default());
        let fanout = RenderFanout::new().with_verdict(verdict.clone());
        let engine = Arc::new(
            Engine::new(backend, Arc::clone(&context), fanout).with_busy(busy.clone()),
        );
        Fixture {
            engine,
            context,
            busy,
            verdict,
            entered,
        }
    }

    /// Open gate: the scripted completion resolves as soon as it is reached.
    fn open_gate() -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        drop(tx);
        rx
    }

    #[tokio::test]
    async fn overlapping_requests_resolve_last_issued_wins() {
        let (g1_tx, g1_rx) = oneshot::channel();
        let (g2_tx, g2_rx) = oneshot::channel();
        let mut fx = fixture(vec![
            (g1_rx, Ok(ok_result(30, false))),
            (g2_rx, Ok(ok_result(85, true))),
        ]);

        let e1 = Arc::clone(&fx.engine);
        let t1 = tokio::spawn(async move { e1.analyze(payload(100.0)).await });
        fx.entered.recv().await.unwrap();

        let e2 = Arc::clone(&fx.engine);
        let t2 = tokio::spawn(async move { e2.analyze(payload(200.0)).await });
        fx.entered.recv().await.unwrap();

        // R2 (newest) completes first and is applied.
        g2_tx.send(()).unwrap();
        assert_eq!(t2.await.unwrap().unwrap(), AnalyzeOutcome::Applied);
        assert_eq!(fx.context.get().await.risk_score, 85);

        // R1 is still in flight: busy must not have been cleared yet.
        assert_eq!(fx.busy.history.lock().unwrap().clone(), vec![true, true]);
        assert_eq!(fx.engine.outstanding(), 1);

        // R1 completes late: discarded entirely, but it is the last
        // outstanding request so it clears the busy indicator.
        g1_tx.send(()).unwrap();
        assert_eq!(t1.await.unwrap().unwrap(), AnalyzeOutcome::Stale);
        assert_eq!(fx.context.get().await.risk_score, 85);
        assert_eq!(fx.verdict.scores.lock().unwrap().clone(), vec![85]);
        assert_eq!(
            fx.busy.history.lock().unwrap().clone(),
            vec![true, true, false]
        );
        assert_eq!(fx.engine.outstanding(), 0);
    }

    #[tokio::test]
    async fn failure_is_terminal_and_context_is_untouched() {
        let mut fx = fixture(vec![
            (open_gate(), Ok(ok_result(25, false))),
            (open_gate(), Err(anyhow!("connection refused"))),
        ]);

        assert_eq!(
            fx.engine.analyze(payload(100.0)).await.unwrap(),
            AnalyzeOutcome::Applied
        );
        assert!(fx.engine.analyze(payload(999.0)).await.is_err());

        // Prior value survives, nothing new rendered, busy cleared.
        let ctx = fx.context.get().await;
        assert_eq!(ctx.risk_score, 25);
        assert_eq!(fx.verdict.scores.lock().unwrap().clone(), vec![25]);
        assert_eq!(
            fx.busy.history.lock().unwrap().clone(),
            vec![true, false, true, false]
        );
        fx.entered.close();
    }

    #[tokio::test]
    async fn backend_reported_error_field_counts_as_failure() {
        let mut result = ok_result(90, true);
        result.error = Some("model unavailable".to_string());
        let mut fx = fixture(vec![(open_gate(), Ok(result))]);

        let err = fx.engine.analyze(payload(100.0)).await.unwrap_err();
        assert!(err.to_string().contains("model unavailable"));

        assert_eq!(fx.context.get().await.risk_score, 0);
        assert!(fx.verdict.scores.lock().unwrap().is_empty());
        assert_eq!(fx.busy.history.lock().unwrap().clone(), vec![true, false]);
        fx.entered.close();
    }

    #[tokio::test]
    async fn invalid_amount_never_issues_a_request() {
        let mut fx = fixture(vec![]);

        assert!(fx.engine.analyze(payload(f64::NAN)).await.is_err());
        assert!(fx.engine.analyze(payload(-5.0)).await.is_err());

        assert_eq!(fx.engine.outstanding(), 0);
        assert!(fx.busy.history.lock().unwrap().is_empty());
        assert!(fx.entered.try_recv().is_err());
    }

    #[tokio::test]
    async fn low_risk_scenario_applies_without_factors() {
        let mut fx = fixture(vec![(open_gate(), Ok(ok_result(25, false)))]);

        assert_eq!(
            fx.engine.analyze(payload(100.0)).await.unwrap(),
            AnalyzeOutcome::Applied
        );

        let ctx = fx.context.get().await;
        assert_eq!(ctx.risk_score, 25);
        assert!(ctx.risk_factors.is_empty());
        // No factors: no bullet list on the verdict surface.
        assert_eq!(fx.verdict.factors.lock().unwrap().clone(), vec![Vec::<String>::new()]);
        fx.entered.close();
    }

    #[tokio::test]
    async fn high_risk_scenario_carries_translated_factor() {
        let mut result = ok_result(85, true);
        result.risk_factors = vec!["Impossible Location detected".to_string()];
        let mut fx = fixture(vec![(open_gate(), Ok(result))]);

        assert_eq!(
            fx.engine.analyze(payload(100.0)).await.unwrap(),
            AnalyzeOutcome::Applied
        );

        let ctx = fx.context.get().await;
        assert_eq!(ctx.risk_score, 85);
        assert_eq!(ctx.risk_factors, vec!["Impossible Location detected"]);
        let factors = fx.verdict.factors.lock().unwrap().clone();
        assert_eq!(factors, vec![vec!["Card used in two distant places at once".to_string()]]);
        fx.entered.close();
    }
}
