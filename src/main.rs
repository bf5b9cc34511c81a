use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

use query_widget::client::http::HttpQueryClient;
use query_widget::config::{AppConfig, CliArgs};
use query_widget::util::logging::init_tracing;
use query_widget::web::{self, state::AppState};
use query_widget::widget::text::{AskError, ask};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    init_tracing();

    // Parse command line arguments
    let args = CliArgs::parse();

    // Load configuration
    let config = match AppConfig::new(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    info!("Using query service at {}", config.service.endpoint);
    let client = HttpQueryClient::new(&config.service)?;

    if let Some(question) = &args.ask {
        return ask_once(&config, &client, question).await;
    }

    let template_env = web::templates::init_templates()?;
    let app_state = Arc::new(AppState::new(config.clone(), template_env, Arc::new(client)));

    // Start the web server
    info!("Starting widget server on {}:{}", config.web.host, config.web.port);
    match web::run_server(config.web, app_state).await {
        Ok(_) => info!("Server stopped gracefully"),
        Err(e) => {
            error!("Server error: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}

// Terminal mode: one submit cycle, printed as text
async fn ask_once(
    config: &AppConfig,
    client: &HttpQueryClient,
    question: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    match ask(&config.widget, client, question).await {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(AskError::Failed { message, output }) => {
            println!("{}", output);
            error!("Query failed: {}", message);
            Err(message.into())
        }
        Err(e) => Err(e.into()),
    }
}
