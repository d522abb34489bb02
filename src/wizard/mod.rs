//! Step-by-step configuration session. Owns the working configuration and
//! sequences analysis, review and generation.
//!
//! Analysis and generation run as background tasks. Each delivers exactly
//! one [`TaskOutcome`] back through the session channel, and the session
//! applies it in [`WizardSession::apply`]. A per-kind in-flight flag gates
//! duplicate submissions.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::analyzer::{AnalysisError, AnalysisResult, Analyzer, FetchError};
use crate::config::{ConfigUpdate, DeploymentConfiguration, UpdateError};
use crate::generator::{GeneratedArtifactSet, GenerationEngine, GenerationError, build_context};
use crate::pricing::{CostBreakdown, CostEstimator};
use crate::security::{SecurityReport, check_configuration};

pub mod steps;

pub use steps::{Admission, EntryAction, STEPS, Step};

#[derive(Debug)]
pub enum TaskOutcome {
    Analysis(Result<AnalysisResult, AnalysisError>),
    Generation(Result<GeneratedArtifactSet, GenerationError>),
}

pub fn analysis_message(error: &AnalysisError) -> &'static str {
    match error {
        AnalysisError::Reference(_) => {
            "That is not a GitHub repository URL. Use https://github.com/<owner>/<repo>."
        }
        AnalysisError::Fetch(FetchError::NotFound) => {
            "Repository or mix.exs not found. Check the URL and that the project uses Mix."
        }
        AnalysisError::Fetch(FetchError::Unauthorized) => {
            "GitHub rejected the access token. Check the token and try again."
        }
        AnalysisError::Fetch(FetchError::RateLimited) => {
            "GitHub rate limit reached. Configure an access token or try again later."
        }
        AnalysisError::Timeout(_) => "Repository analysis took too long. Try again.",
        _ => "Could not analyze the repository. Try again later.",
    }
}

pub fn generation_message(error: &GenerationError) -> &'static str {
    match error {
        GenerationError::TemplateNotFound(_) => {
            "A deployment template is missing. Check the templates directory setting."
        }
        GenerationError::Timeout(_) => "Artifact generation took too long. Try again.",
        _ => "Could not generate the deployment files.",
    }
}

pub fn update_message(error: &UpdateError) -> String {
    match error {
        UpdateError::InvalidInteger { field, .. } => {
            format!("{field} must be a whole number. Nothing was changed.")
        }
        UpdateError::InvalidEnvironment(_) => {
            "Environment must be development, staging or production. Nothing was changed."
                .to_string()
        }
        UpdateError::UnsafeValue { field, .. } => format!(
            "{field} may only contain letters, digits, '.', '-' and '_'. Nothing was changed."
        ),
    }
}

pub struct WizardSession {
    step: Step,
    config: DeploymentConfiguration,
    analysis: Option<AnalysisResult>,

    analyzing: bool,
    generating: bool,

    cost: Option<CostBreakdown>,
    security: Option<SecurityReport>,
    artifacts: Option<GeneratedArtifactSet>,
    message: Option<String>,

    analyzer: Analyzer,
    engine: Arc<GenerationEngine>,
    estimator: CostEstimator,
    timeout: Duration,

    analysis_task: Option<JoinHandle<()>>,
    generation_task: Option<JoinHandle<()>>,
    outcomes_tx: mpsc::UnboundedSender<TaskOutcome>,
    outcomes_rx: mpsc::UnboundedReceiver<TaskOutcome>,
}

impl WizardSession {
    pub fn new(analyzer: Analyzer, engine: Arc<GenerationEngine>, timeout: Duration) -> Self {
        let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();

        Self {
            step: Step::Repository,
            config: DeploymentConfiguration::default(),
            analysis: None,
            analyzing: false,
            generating: false,
            cost: None,
            security: None,
            artifacts: None,
            message: None,
            analyzer,
            engine,
            estimator: CostEstimator::default(),
            timeout,
            analysis_task: None,
            generation_task: None,
            outcomes_tx,
            outcomes_rx,
        }
    }

    pub fn with_config(mut self, config: DeploymentConfiguration) -> Self {
        self.config = config;
        self
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn config(&self) -> &DeploymentConfiguration {
        &self.config
    }

    pub fn analysis(&self) -> Option<&AnalysisResult> {
        self.analysis.as_ref()
    }

    pub fn is_analyzing(&self) -> bool {
        self.analyzing
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    pub fn cost(&self) -> Option<&CostBreakdown> {
        self.cost.as_ref()
    }

    pub fn security(&self) -> Option<&SecurityReport> {
        self.security.as_ref()
    }

    pub fn artifacts(&self) -> Option<&GeneratedArtifactSet> {
        self.artifacts.as_ref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn take_message(&mut self) -> Option<String> {
        self.message.take()
    }

    fn enter(&mut self, step: Step) {
        debug!(from = %self.step, to = %step, "wizard step");
        self.step = step;

        match step.entry_action() {
            EntryAction::RecomputeReview => self.enter_review(),
            EntryAction::None => {}
        }
    }

    pub fn advance(&mut self) {
        if let Some(next) = self.step.next() {
            self.enter(next);
        }
    }

    pub fn retreat(&mut self) {
        if let Some(previous) = self.step.previous() {
            self.enter(previous);
        }
    }

    /// Returns whether the jump happened.
    pub fn jump_to(&mut self, target: Step) -> bool {
        match self.step.admits(target, self.analysis.is_some()) {
            Some(admission) => {
                debug!(?admission, %target, "jump admitted");
                self.enter(target);
                true
            }
            None => {
                debug!(from = %self.step, %target, "jump rejected");
                false
            }
        }
    }

    /// Applies a partial update atomically. On failure the configuration is
    /// untouched and a message is recorded.
    pub fn merge_configuration(&mut self, update: &ConfigUpdate) -> bool {
        match self.config.merge(update) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "configuration update rejected");
                self.message = Some(update_message(&e));
                false
            }
        }
    }

    /// Recomputes cost and security from the current configuration.
    pub fn enter_review(&mut self) {
        self.cost = Some(self.estimator.estimate(&self.config));
        self.security = Some(check_configuration(&self.config));
    }

    /// Starts an analysis unless one is already running. Returns whether a
    /// task was dispatched.
    pub fn submit_analysis(&mut self, url: &str) -> bool {
        if self.analyzing {
            debug!("analysis already in flight, ignoring submission");
            return false;
        }

        self.analyzing = true;
        self.message = None;

        let analyzer = self.analyzer.clone();
        let outcomes = self.outcomes_tx.clone();
        let timeout = self.timeout;
        let url = url.to_string();

        self.analysis_task = Some(tokio::spawn(async move {
            let result = match tokio::time::timeout(timeout, analyzer.analyze(&url)).await {
                Ok(result) => result,
                Err(_) => Err(AnalysisError::Timeout(timeout.as_secs())),
            };

            if outcomes.send(TaskOutcome::Analysis(result)).is_err() {
                debug!("session closed before analysis finished");
            }
        }));

        true
    }

    /// Starts a generation over the current configuration unless one is
    /// already running. Returns whether a task was dispatched.
    pub fn submit_generation(&mut self) -> bool {
        if self.generating {
            debug!("generation already in flight, ignoring submission");
            return false;
        }

        self.generating = true;
        self.artifacts = None;
        self.message = None;

        let engine = self.engine.clone();
        let context = build_context(&self.config, self.analysis.as_ref());
        let outcomes = self.outcomes_tx.clone();
        let timeout = self.timeout;

        self.generation_task = Some(tokio::spawn(async move {
            let work = tokio::task::spawn_blocking(move || engine.generate_all(&context));

            let result = match tokio::time::timeout(timeout, work).await {
                Ok(Ok(result)) => result,
                Ok(Err(e)) => Err(GenerationError::Interrupted(e.to_string())),
                Err(_) => Err(GenerationError::Timeout(timeout.as_secs())),
            };

            if outcomes.send(TaskOutcome::Generation(result)).is_err() {
                debug!("session closed before generation finished");
            }
        }));

        true
    }

    /// Re-enters the session with the result of a background task.
    pub fn apply(&mut self, outcome: TaskOutcome) {
        match outcome {
            TaskOutcome::Analysis(result) => {
                self.analyzing = false;
                self.analysis_task = None;

                match result {
                    Ok(analysis) => {
                        if let Some(name) = &analysis.app_name {
                            let update = ConfigUpdate::from([("app_name".to_string(), name.clone())]);
                            self.merge_configuration(&update);
                        }

                        self.analysis = Some(analysis);
                        self.jump_to(Step::Environment);
                    }
                    Err(e) => {
                        warn!(error = %e, "repository analysis failed");
                        self.message = Some(analysis_message(&e).to_string());
                    }
                }
            }
            TaskOutcome::Generation(result) => {
                self.generating = false;
                self.generation_task = None;

                match result {
                    Ok(artifacts) => self.artifacts = Some(artifacts),
                    Err(e) => {
                        warn!(error = %e, "artifact generation failed");
                        self.artifacts = None;
                        self.message = Some(generation_message(&e).to_string());
                    }
                }
            }
        }
    }

    /// Applies outcomes that already arrived, without waiting.
    pub fn poll(&mut self) {
        while let Ok(outcome) = self.outcomes_rx.try_recv() {
            self.apply(outcome);
        }
    }

    /// Waits until no task is in flight.
    pub async fn settle(&mut self) {
        while self.analyzing || self.generating {
            match self.outcomes_rx.recv().await {
                Some(outcome) => self.apply(outcome),
                None => break,
            }
        }
    }
}

impl Drop for WizardSession {
    fn drop(&mut self) {
        for task in [self.analysis_task.take(), self.generation_task.take()]
            .into_iter()
            .flatten()
        {
            task.abort();
        }
    }
}
