//! Concurrent multi-document runner

use crate::error::FlowError;
use crate::flow::{DocumentFlow, FlowConfig, FlowOutcome, FlowParticipants};
use moorline_client::DocumentApi;
use moorline_types::InvoiceRecord;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Run one lifecycle per record, concurrently.
///
/// Each document gets its own task; outcomes are funneled back through a
/// channel and returned in record order. A failed document is logged and
/// reported in its slot without aborting the others; flows share nothing
/// but the read-only participants/config and the client.
pub async fn run_all<A>(
    api: Arc<A>,
    participants: FlowParticipants,
    config: FlowConfig,
    records: Vec<InvoiceRecord>,
) -> Vec<Result<FlowOutcome, FlowError>>
where
    A: DocumentApi + 'static,
{
    let total = records.len();
    let (tx, mut rx) = mpsc::channel(total.max(1));

    for (index, record) in records.into_iter().enumerate() {
        let api = api.clone();
        let participants = participants.clone();
        let config = config.clone();
        let tx = tx.clone();

        tokio::spawn(async move {
            let mut flow = DocumentFlow::new(api, participants, config);
            let outcome = flow.run(&record).await;
            if let Err(err) = &outcome {
                tracing::error!(
                    reference_id = %record.reference_id,
                    error = %err,
                    "document lifecycle failed"
                );
            }
            let _ = tx.send((index, outcome)).await;
        });
    }
    drop(tx);

    let mut slots: Vec<Option<Result<FlowOutcome, FlowError>>> =
        (0..total).map(|_| None).collect();
    while let Some((index, outcome)) = rx.recv().await {
        slots[index] = Some(outcome);
    }

    slots
        .into_iter()
        .map(|slot| slot.unwrap_or(Err(FlowError::Aborted)))
        .collect()
}
