use agentstream::adapters::ReqwestHttpClient;
use agentstream::cli::{parse_args, run_cli_command, CliCommand, LivePrinter};
use agentstream::config::TransportConfig;
use agentstream::controller::ConnectionController;
use agentstream::transport::ConnectOutcome;

use color_eyre::{Report, Result};
use std::io::Write;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const ENV_LOG: &str = "AGENTSTREAM_LOG";

/// Logs go to stderr so stdout carries only the transcript.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn stream(query: String, conversation: Option<String>) -> Result<()> {
    let config = TransportConfig::from_env()?;
    let controller = Arc::new(ConnectionController::new(config, ReqwestHttpClient::new()));

    let mut request = controller.request(query);
    if let Some(conversation_id) = conversation {
        request = request.with_conversation(conversation_id);
    }

    let mut snapshots = controller.subscribe();
    let printer = tokio::spawn(async move {
        let mut printer = LivePrinter::new();
        let mut stdout = std::io::stdout();
        while snapshots.changed().await.is_ok() {
            let store = snapshots.borrow_and_update().clone();
            let text = printer.update(&store);
            if !text.is_empty() {
                let _ = write!(stdout, "{}", text);
                let _ = stdout.flush();
            }
        }
    });

    let interrupt = {
        let controller = controller.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                controller.close();
            }
        })
    };

    let outcome = controller.connect(&request).await;
    interrupt.abort();
    drop(controller);
    let _ = printer.await;
    println!();

    match outcome {
        ConnectOutcome::Failed(err) => {
            let message = err.user_message_with_hint();
            Err(Report::new(err).wrap_err(message))
        }
        _ => Ok(()),
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let command = parse_args(std::env::args());
    if let Some(result) = run_cli_command(&command) {
        return result;
    }

    if let CliCommand::Stream {
        query,
        conversation,
    } = command
    {
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(stream(query, conversation))?;
    }
    Ok(())
}
