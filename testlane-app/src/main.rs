mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info};

use config::Config;
use testlane_client::HttpExecutionApi;
use testlane_monitor::{ExecutionMonitor, ExecutionRequest, MonitorConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        println!("Usage: testlane [config.toml]");
        return Ok(());
    }

    let config_path = args
        .get(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    let config = Config::load(&config_path)?;
    config.validate()?;

    init_tracing(config.verbose);

    let client = Arc::new(HttpExecutionApi::new(
        config.api.endpoint.clone(),
        config.api.key.clone(),
    ));

    let mut request = ExecutionRequest::new(
        config.run.project_id.clone(),
        config.run.item_id.clone(),
        config.run.kind,
    );
    request.agent_id = config.run.agent_id.clone();
    request.browser = config.run.browser.clone();
    request.device = config.run.device.clone();
    request.parameters = config.run.parameters.clone();

    let monitor_config = MonitorConfig {
        wait_seconds: config.run.wait_seconds,
        report_destination: config.run.junit_results_file.clone(),
        ..Default::default()
    };

    let monitor = Arc::new(ExecutionMonitor::new(client, request));

    // Ctrl-C stops the polling schedule and fires a best-effort remote
    // abort; the run itself still reports its own outcome.
    {
        let monitor = monitor.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupted, aborting the execution...");
                monitor.abort().await;
            }
        });
    }

    info!(
        "Sending a {} run command for {} under project {}",
        config.run.kind, config.run.item_id, config.run.project_id
    );

    match monitor.run(&monitor_config).await {
        Ok(_) => Ok(()),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();
}
