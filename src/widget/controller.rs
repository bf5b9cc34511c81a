use crate::client::models::{QueryRequest, QueryResponse};
use crate::client::{ClientError, QueryService};
use crate::config::WidgetConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// What happens to the last good result when a later submit fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Drop the previous result; only the error is shown
    #[default]
    Clear,
    /// Keep showing the previous result, flagged as stale
    Keep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ControllerState {
    Idle,
    Loading,
    Success,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitRejected {
    #[error("question is empty")]
    EmptyQuestion,
    #[error("a query is already in flight")]
    InFlight,
}

/// In-memory state of one widget instance
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResultSession {
    pub question: String,
    pub include_analysis: bool,
    pub loading: bool,
    pub error: Option<String>,
    pub result: Option<QueryResponse>,
    /// Set when `result` belongs to an earlier question than the failed one
    pub stale: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Owns the session and is the only thing that mutates it.
#[derive(Debug)]
pub struct ResultController {
    session: ResultSession,
    use_cache: bool,
    on_failure: FailurePolicy,
}

impl ResultController {
    pub fn new(config: &WidgetConfig) -> Self {
        Self {
            session: ResultSession {
                include_analysis: config.include_analysis,
                ..ResultSession::default()
            },
            use_cache: config.use_cache,
            on_failure: config.on_failure,
        }
    }

    pub fn session(&self) -> &ResultSession {
        &self.session
    }

    pub fn state(&self) -> ControllerState {
        if self.session.loading {
            ControllerState::Loading
        } else if self.session.error.is_some() {
            ControllerState::Failed
        } else if self.session.result.is_some() {
            ControllerState::Success
        } else {
            ControllerState::Idle
        }
    }

    pub fn set_question(&mut self, question: impl Into<String>) {
        self.session.question = question.into();
    }

    pub fn set_include_analysis(&mut self, include_analysis: bool) {
        self.session.include_analysis = include_analysis;
    }

    /// Moves the session into Loading and hands back the request to send.
    /// A rejected submit leaves the session exactly as it was.
    pub fn begin_submit(&mut self) -> Result<QueryRequest, SubmitRejected> {
        if self.session.loading {
            debug!("Submit ignored, a query is already in flight");
            return Err(SubmitRejected::InFlight);
        }

        let question = self.session.question.trim();
        if question.is_empty() {
            debug!("Submit ignored, question is empty");
            return Err(SubmitRejected::EmptyQuestion);
        }

        let mut request = QueryRequest::new(question);
        request.include_analysis = self.session.include_analysis;
        request.use_cache = self.use_cache;

        info!("Submitting question: {}", request.question);
        self.session.loading = true;
        self.session.error = None;

        Ok(request)
    }

    /// Form submit: the edited question and analysis toggle arrive with the submit itself.
    /// While Loading the edit is dropped along with the submit.
    pub fn begin_submit_with(
        &mut self,
        question: impl Into<String>,
        include_analysis: bool,
    ) -> Result<QueryRequest, SubmitRejected> {
        if self.session.loading {
            return Err(SubmitRejected::InFlight);
        }
        self.set_question(question);
        self.set_include_analysis(include_analysis);
        self.begin_submit()
    }

    /// A suggested follow-up was picked: it becomes the question and is submitted right away.
    pub fn begin_follow_up(&mut self, question: impl Into<String>) -> Result<QueryRequest, SubmitRejected> {
        if self.session.loading {
            return Err(SubmitRejected::InFlight);
        }
        info!("Following up with a suggested question");
        self.set_question(question);
        self.begin_submit()
    }

    /// Applies the outcome of the in-flight request.
    pub fn complete(&mut self, outcome: Result<QueryResponse, ClientError>) {
        if !self.session.loading {
            warn!("Dropping a query completion that arrived with nothing in flight");
            return;
        }

        self.session.loading = false;
        self.session.completed_at = Some(Utc::now());

        match outcome {
            Ok(response) => {
                info!(
                    "Query succeeded: {} rows, cached: {}",
                    response.rows.len(),
                    response.cached
                );
                self.session.result = Some(response);
                self.session.error = None;
                self.session.stale = false;
            }
            Err(e) => {
                warn!("Query failed: {}", e);
                self.session.error = Some(e.to_string());
                match self.on_failure {
                    FailurePolicy::Clear => {
                        self.session.result = None;
                        self.session.stale = false;
                    }
                    FailurePolicy::Keep => {
                        self.session.stale = self.session.result.is_some();
                    }
                }
            }
        }
    }

    /// Runs one full submit cycle against `service`.
    pub async fn submit<S>(&mut self, service: &S) -> Result<ControllerState, SubmitRejected>
    where
        S: QueryService + ?Sized,
    {
        let request = self.begin_submit()?;
        let outcome = service.query(&request).await;
        self.complete(outcome);
        Ok(self.state())
    }

    pub async fn follow_up<S>(
        &mut self,
        question: impl Into<String>,
        service: &S,
    ) -> Result<ControllerState, SubmitRejected>
    where
        S: QueryService + ?Sized,
    {
        let request = self.begin_follow_up(question)?;
        let outcome = service.query(&request).await;
        self.complete(outcome);
        Ok(self.state())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Answers from a queue and records every request it sees
    #[derive(Default)]
    pub(crate) struct ScriptedService {
        pub(crate) outcomes: Mutex<VecDeque<Result<QueryResponse, ClientError>>>,
        pub(crate) requests: Mutex<Vec<QueryRequest>>,
    }

    impl ScriptedService {
        pub(crate) fn with(outcomes: Vec<Result<QueryResponse, ClientError>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl QueryService for ScriptedService {
        async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, ClientError> {
            self.requests.lock().unwrap().push(request.clone());
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ClientError::Transport("no scripted outcome".into())))
        }
    }

    pub(crate) fn revenue_response() -> QueryResponse {
        serde_json::from_value(json!({
            "question": "total revenue by month",
            "sql": "select month, total from revenue",
            "data": [{"month": "Jan", "total": 100}, {"month": "Feb", "total": 150}],
            "execution_time_ms": 12,
            "row_count": 2,
            "cached": false,
            "analysis": {
                "headline": "Revenue grew 50% month over month",
                "insights": [
                    {"title": "Growth", "description": "Feb beat Jan", "significance": "High"}
                ],
                "explanation": "February revenue was higher.",
                "suggested_questions": ["break down by region"],
                "chart_type": "Bar"
            }
        }))
        .unwrap()
    }

    pub(crate) fn internal_server_error() -> ClientError {
        ClientError::Service {
            status: 500,
            status_text: "Internal Server Error".to_string(),
        }
    }

    fn controller(on_failure: FailurePolicy) -> ResultController {
        let mut config = crate::config::AppConfig::default().widget;
        config.on_failure = on_failure;
        ResultController::new(&config)
    }

    #[tokio::test]
    async fn blank_question_is_not_submitted() {
        let service = ScriptedService::default();
        let mut controller = controller(FailurePolicy::Clear);

        controller.set_question("   \t ");
        assert_eq!(
            controller.submit(&service).await,
            Err(SubmitRejected::EmptyQuestion)
        );
        assert_eq!(controller.state(), ControllerState::Idle);
        assert_eq!(service.calls(), 0);
    }

    #[tokio::test]
    async fn blank_question_after_success_keeps_result() {
        let service = ScriptedService::with(vec![Ok(revenue_response())]);
        let mut controller = controller(FailurePolicy::Clear);

        controller.set_question("total revenue by month");
        controller.submit(&service).await.unwrap();
        controller.set_question("");

        assert_eq!(
            controller.submit(&service).await,
            Err(SubmitRejected::EmptyQuestion)
        );
        assert_eq!(controller.state(), ControllerState::Success);
        assert!(controller.session().result.is_some());
        assert_eq!(service.calls(), 1);
    }

    #[test]
    fn second_submit_while_loading_is_rejected() {
        let mut controller = controller(FailurePolicy::Clear);
        controller.set_question("total revenue by month");

        assert!(controller.begin_submit().is_ok());
        controller.set_question("something else");
        assert_eq!(controller.begin_submit(), Err(SubmitRejected::InFlight));
        assert_eq!(controller.state(), ControllerState::Loading);
        assert!(controller.session().loading);
    }

    #[tokio::test]
    async fn request_uses_trimmed_question_and_toggles() {
        let service = ScriptedService::with(vec![Ok(revenue_response())]);
        let mut controller = controller(FailurePolicy::Clear);

        controller.set_question("  total revenue by month  ");
        controller.set_include_analysis(false);
        controller.submit(&service).await.unwrap();

        let requests = service.requests.lock().unwrap();
        assert_eq!(
            requests[0],
            QueryRequest {
                question: "total revenue by month".to_string(),
                include_analysis: false,
                use_cache: true,
            }
        );
    }

    #[tokio::test]
    async fn success_stores_response_verbatim() {
        let service = ScriptedService::with(vec![Ok(revenue_response())]);
        let mut controller = controller(FailurePolicy::Clear);

        controller.set_question("total revenue by month");
        let state = controller.submit(&service).await.unwrap();

        assert_eq!(state, ControllerState::Success);
        let session = controller.session();
        assert_eq!(session.result.as_ref(), Some(&revenue_response()));
        assert!(session.error.is_none());
        assert!(!session.loading);
        assert!(session.completed_at.is_some());
    }

    #[tokio::test]
    async fn failure_after_success_clears_result_by_default() {
        let service = ScriptedService::with(vec![
            Ok(revenue_response()),
            Err(internal_server_error()),
        ]);
        let mut controller = controller(FailurePolicy::Clear);

        controller.set_question("total revenue by month");
        controller.submit(&service).await.unwrap();
        let state = controller.submit(&service).await.unwrap();

        assert_eq!(state, ControllerState::Failed);
        let session = controller.session();
        assert!(
            session
                .error
                .as_deref()
                .unwrap()
                .contains("Internal Server Error")
        );
        assert!(session.result.is_none());
    }

    #[tokio::test]
    async fn failure_after_success_can_keep_stale_result() {
        let service = ScriptedService::with(vec![
            Ok(revenue_response()),
            Err(internal_server_error()),
            Ok(revenue_response()),
        ]);
        let mut controller = controller(FailurePolicy::Keep);

        controller.set_question("total revenue by month");
        controller.submit(&service).await.unwrap();
        controller.submit(&service).await.unwrap();

        assert_eq!(controller.state(), ControllerState::Failed);
        assert!(controller.session().result.is_some());
        assert!(controller.session().stale);

        // Retrying is just another submit
        assert_eq!(
            controller.submit(&service).await,
            Ok(ControllerState::Success)
        );
        assert!(!controller.session().stale);
        assert!(controller.session().error.is_none());
    }

    #[tokio::test]
    async fn follow_up_sets_question_and_submits_once() {
        let service = ScriptedService::with(vec![Ok(revenue_response()), Ok(revenue_response())]);
        let mut controller = controller(FailurePolicy::Clear);

        controller.set_question("total revenue by month");
        controller.submit(&service).await.unwrap();
        controller
            .follow_up("break down by region", &service)
            .await
            .unwrap();

        assert_eq!(controller.session().question, "break down by region");
        assert_eq!(service.calls(), 2);
        assert_eq!(
            service.requests.lock().unwrap()[1].question,
            "break down by region"
        );
    }

    #[tokio::test]
    async fn follow_up_while_loading_changes_nothing() {
        let service = ScriptedService::default();
        let mut controller = controller(FailurePolicy::Clear);

        controller.set_question("total revenue by month");
        controller.begin_submit().unwrap();

        assert_eq!(
            controller.follow_up("break down by region", &service).await,
            Err(SubmitRejected::InFlight)
        );
        assert_eq!(controller.session().question, "total revenue by month");
        assert_eq!(service.calls(), 0);
    }

    #[test]
    fn completion_without_request_is_ignored() {
        let mut controller = controller(FailurePolicy::Clear);

        controller.complete(Ok(revenue_response()));

        assert_eq!(controller.state(), ControllerState::Idle);
        assert!(controller.session().result.is_none());
    }
}
