//! Command implementations

use crate::config::MoorlineConfig;
use crate::error::{CliError, CliResult};
use crate::routing::RoutingApi;
use crate::rows;
use moorline_flow::{build_template, run_all, FlowConfig, FlowParticipants, TemplateRef};
use moorline_types::InvoiceRecord;
use std::path::Path;
use std::sync::Arc;

fn participants(config: &MoorlineConfig) -> FlowParticipants {
    FlowParticipants {
        owner: config.accounts[0].id.clone(),
        collaborator: config.accounts[1].id.clone(),
    }
}

fn flow_config(config: &MoorlineConfig) -> CliResult<FlowConfig> {
    let module = std::fs::read(&config.compute.module_path)?;
    let mut flow = FlowConfig::new(
        &config.registry.nft_registry,
        &config.registry.asset_contract,
        &config.registry.deposit_address,
        module,
    );
    flow.input_labels = config.compute.input_labels.clone();
    flow.output_label = config.compute.output_label.clone();
    if let Some(template) = &config.template {
        flow = flow.with_template(TemplateRef {
            document_id: template.document_id.clone(),
            fingerprint: template.fingerprint.clone(),
        });
    }
    Ok(flow)
}

/// Drive the full lifecycle for one demo document or a rows file.
pub async fn run(
    config: &MoorlineConfig,
    rows_path: Option<&Path>,
    has_header: bool,
) -> CliResult<()> {
    let records = match rows_path {
        Some(path) => rows::read_rows(path, has_header)?,
        None => vec![InvoiceRecord::demo()],
    };
    let total = records.len();
    tracing::info!(total, "running document lifecycles");

    let api = Arc::new(RoutingApi::from_config(config)?);
    let outcomes = run_all(api, participants(config), flow_config(config)?, records).await;

    let mut failed = 0;
    for outcome in &outcomes {
        match outcome {
            Ok(outcome) => {
                println!("Anchored document: {}", outcome.document_id);
                if let Some(fingerprint) = &outcome.fingerprint {
                    println!("Document fingerprint: {fingerprint}");
                }
                println!(
                    "Compute result: risk = {} value = {}",
                    outcome.result.risk, outcome.result.value
                );
                println!("NFT token: {}", outcome.token_id);
            }
            Err(err) => {
                failed += 1;
                tracing::error!(error = %err, "lifecycle failed");
            }
        }
    }

    if failed > 0 {
        return Err(CliError::Lifecycle { failed, total });
    }
    Ok(())
}

/// Create, set up, and anchor a reusable template document.
pub async fn template(config: &MoorlineConfig) -> CliResult<()> {
    tracing::info!("building template document");
    let api = RoutingApi::from_config(config)?;
    let template = build_template(&api, &participants(config), &flow_config(config)?).await?;

    println!("Template: {}", template.document_id);
    if let Some(fingerprint) = &template.fingerprint {
        println!("Template fingerprint: {fingerprint}");
    }
    Ok(())
}

/// Print the effective configuration.
pub fn show_config(config: &MoorlineConfig) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
