use crate::client::{ClientError, QueryService};
use crate::client::models::QueryRequest;
use crate::config::AppConfig;
use crate::widget::WidgetView;
use crate::widget::chart::Palette;
use crate::widget::controller::{ControllerState, ResultController, SubmitRejected};
use minijinja::Environment;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

/// Shared application state for the web server
pub struct AppState {
    pub config: AppConfig,
    pub template_env: Environment<'static>,
    pub service: Arc<dyn QueryService>,
    pub palette: Palette,
    // The one widget session this server hosts
    controller: Mutex<ResultController>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        template_env: Environment<'static>,
        service: Arc<dyn QueryService>,
    ) -> Self {
        let controller = ResultController::new(&config.widget);
        let palette = Palette::new(config.widget.palette.clone());

        Self {
            config,
            template_env,
            service,
            palette,
            controller: Mutex::new(controller),
        }
    }

    pub async fn view(&self) -> WidgetView {
        let controller = self.controller.lock().await;
        WidgetView::from_session(controller.session(), controller.state(), &self.palette)
    }

    /// Form submit from the page
    pub async fn submit(
        self: &Arc<Self>,
        question: String,
        include_analysis: bool,
    ) -> Result<ControllerState, SubmitRejected> {
        let request = self
            .controller
            .lock()
            .await
            .begin_submit_with(question, include_analysis)?;
        self.finish(request).await
    }

    /// A suggested question was clicked
    pub async fn follow_up(self: &Arc<Self>, question: String) -> Result<ControllerState, SubmitRejected> {
        let request = self.controller.lock().await.begin_follow_up(question)?;
        self.finish(request).await
    }

    // The lock is not held while the service call is outstanding; the controller's
    // Loading state is what keeps a second request out. The call runs on its own task
    // so a browser that goes away mid-request cannot leave the session stuck in Loading.
    async fn finish(
        self: &Arc<Self>,
        request: QueryRequest,
    ) -> Result<ControllerState, SubmitRejected> {
        let state = Arc::clone(self);
        let cycle = tokio::spawn(async move {
            let outcome = state.service.query(&request).await;

            let mut controller = state.controller.lock().await;
            controller.complete(outcome);
            controller.state()
        });

        match cycle.await {
            Ok(state) => {
                info!("Submit cycle finished in state {:?}", state);
                Ok(state)
            }
            Err(e) => {
                error!("Submit cycle task failed: {}", e);
                let mut controller = self.controller.lock().await;
                controller.complete(Err(ClientError::Transport(e.to_string())));
                Ok(controller.state())
            }
        }
    }
}
