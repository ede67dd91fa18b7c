use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::sink::NotificationSink;
use crate::classifier::{DeepContentClassifier, RiskAssessment};
use crate::config::{Settings, SettingsProvider};
use crate::error::{ClassifyError, EvaluationError, InputError};
use crate::verdict::{Verdict, VerdictAggregator};

/// What happened to a page-load evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// The verdict was pushed to the sink.
    Delivered(Verdict),
    /// A newer request or a navigation superseded this one; nothing was pushed.
    Discarded,
}

struct InFlight {
    request_id: Uuid,
    cancel: CancellationToken,
}

/// Connects page events to the pipelines and the display surface.
///
/// Each target (a tab, a window, a CLI invocation) has at most one live
/// evaluation; starting a new one or navigating away cancels the previous
/// request so its result never reaches a stale display.
pub struct PageMonitor {
    aggregator: VerdictAggregator,
    classifier: DeepContentClassifier,
    settings: Arc<dyn SettingsProvider>,
    sink: Arc<dyn NotificationSink>,
    in_flight: Mutex<HashMap<String, InFlight>>,
}

impl PageMonitor {
    pub fn new(
        aggregator: VerdictAggregator,
        classifier: DeepContentClassifier,
        settings: Arc<dyn SettingsProvider>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            aggregator,
            classifier,
            settings,
            sink,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Evaluate `url` for `target` and publish the verdict unless superseded.
    pub async fn page_loaded(&self, target: &str, url: &str) -> Result<Delivery, InputError> {
        let request_id = Uuid::new_v4();
        let cancel = CancellationToken::new();
        self.register(target, request_id, cancel.clone());

        let settings = self.current_settings();
        tracing::debug!(target_id = %target, request_id = %request_id, url = %url, "evaluation started");

        let outcome = self
            .aggregator
            .evaluate_cancellable(url, &settings, &cancel)
            .await;
        let still_current = self.retire(target, request_id);

        match outcome {
            Ok(verdict) if still_current => {
                self.sink.publish_verdict(target, &verdict);
                Ok(Delivery::Delivered(verdict))
            }
            Ok(_) | Err(EvaluationError::Cancelled) => {
                tracing::debug!(target_id = %target, request_id = %request_id, "stale evaluation discarded");
                Ok(Delivery::Discarded)
            }
            Err(EvaluationError::Input(e)) => {
                tracing::warn!(target_id = %target, url = %url, error = %e, "evaluation rejected");
                Err(e)
            }
        }
    }

    /// The target left the page; drop any evaluation still running for it.
    pub fn navigated_away(&self, target: &str) {
        let previous = self
            .in_flight
            .lock()
            .ok()
            .and_then(|mut map| map.remove(target));
        if let Some(previous) = previous {
            previous.cancel.cancel();
            tracing::debug!(target_id = %target, request_id = %previous.request_id, "evaluation cancelled");
        }
    }

    /// User-triggered deep content classification.
    ///
    /// The outcome, success or error, is published as its own event and is
    /// never folded into the page verdict.
    pub async fn deep_analysis(
        &self,
        target: &str,
        url: &str,
        page_text: &str,
    ) -> Result<RiskAssessment, ClassifyError> {
        let settings = self.current_settings();
        let outcome = self.classifier.classify(url, page_text, &settings).await;
        self.sink.publish_assessment(target, &outcome);
        outcome
    }

    /// Number of evaluations currently running.
    pub fn in_flight(&self) -> usize {
        self.in_flight.lock().map_or(0, |map| map.len())
    }

    fn current_settings(&self) -> Settings {
        self.settings.load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "settings unavailable, using defaults");
            Settings::default()
        })
    }

    fn register(&self, target: &str, request_id: Uuid, cancel: CancellationToken) {
        let previous = self.in_flight.lock().ok().and_then(|mut map| {
            map.insert(target.to_string(), InFlight { request_id, cancel })
        });
        if let Some(previous) = previous {
            previous.cancel.cancel();
            tracing::debug!(target_id = %target, request_id = %previous.request_id, "superseded");
        }
    }

    /// Remove our entry if it is still ours. Returns whether it was.
    fn retire(&self, target: &str, request_id: Uuid) -> bool {
        let Ok(mut map) = self.in_flight.lock() else {
            return false;
        };
        match map.get(target) {
            Some(entry) if entry.request_id == request_id => {
                map.remove(target);
                true
            }
            _ => false,
        }
    }
}
