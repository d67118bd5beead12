use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use aerolog::{
    agents::{ClassificationAgent, PredictionAgent, ThresholdScorer},
    cli::config_path_from_args,
    config::Config,
    ingress::{RawReading, unix_millis_now, validate_reading},
    ledger::{AuditLedgerClient, MemoryLedger},
    logging::init_tracing,
    orchestrator::Orchestrator,
    policy::DecisionPolicy,
    window::ContextWindowStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = config_path_from_args()?;
    let config = if config_path.exists() {
        Config::load(&config_path)
            .with_context(|| format!("failed to load config from {}", config_path.display()))?
    } else {
        Config::default()
    };

    let logging_guard = init_tracing(&config.logging)?;
    tracing::info!(
        target: "aerolog",
        run_id = %logging_guard.run_id(),
        "pipeline_starting"
    );

    let window = Arc::new(ContextWindowStore::new(config.window.capacity));
    let classifier = ClassificationAgent::new(config.classifier.clone());
    let predictor = PredictionAgent::new(Arc::new(ThresholdScorer::default()), config.window.capacity);
    let policy = DecisionPolicy::new(config.policy.clone());
    let ledger = Arc::new(AuditLedgerClient::new(
        Arc::new(MemoryLedger::new()),
        config.ledger.clone(),
    ));
    let orchestrator = Orchestrator::new(window, classifier, predictor, policy, ledger);

    // Transport-free ingestion boundary: one NDJSON reading per stdin line,
    // one NDJSON outcome per stdout line.
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let mut lines = stdin.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let raw: RawReading = match serde_json::from_str(&line) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(target: "ingress", error = %err, "reading_rejected_malformed");
                write_line(
                    &mut stdout,
                    &serde_json::json!({"error": format!("malformed reading: {err}")}),
                )
                .await?;
                continue;
            }
        };

        let reading = match validate_reading(raw, unix_millis_now()) {
            Ok(reading) => reading,
            Err(err) => {
                tracing::warn!(target: "ingress", error = %err, "reading_rejected_invalid");
                write_line(&mut stdout, &serde_json::json!({"error": err.to_string()})).await?;
                continue;
            }
        };

        let outcome = orchestrator.handle(reading).await;
        write_line(&mut stdout, &serde_json::to_value(&outcome)?).await?;
    }

    tracing::info!(target: "aerolog", "pipeline_shutdown");
    Ok(())
}

async fn write_line(
    stdout: &mut tokio::io::Stdout,
    value: &serde_json::Value,
) -> anyhow::Result<()> {
    let mut line = serde_json::to_vec(value)?;
    line.push(b'\n');
    stdout
        .write_all(&line)
        .await
        .context("failed to write outcome to stdout")?;
    Ok(())
}
