use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::{
    base::types::{Classification, IngestPayload, MaintenanceRequest, NewMaintenanceRequest, Res, TicketSubmission},
    service::{db::DbClient, llm::LlmClient},
};

use super::InteractionError;

/// Response of a successful ingest: the stored record and the triage used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestedTicket {
    pub request: MaintenanceRequest,
    pub ai: Classification,
}

/// Validate, triage, and persist a tenant submission.
///
/// Validation failures return before any external call.  Triage failures never
/// surface: [`collapse_triage`] substitutes the fallback classification.
#[instrument(skip_all)]
pub async fn ingest_ticket(payload: IngestPayload, db: &DbClient, llm: &LlmClient) -> Result<IngestedTicket, InteractionError> {
    let submission = TicketSubmission::try_from(payload)?;

    let ai = collapse_triage(llm.triage_ticket(&submission.text).await);

    let request = db.create_request(NewMaintenanceRequest::triaged(submission, &ai)).await.map_err(InteractionError::Store)?;

    info!("Ticket `{}` ingested as {}.", request.id, request.category);

    Ok(IngestedTicket { request, ai })
}

/// Collapse a triage result to a classification, falling back on any error.
pub fn collapse_triage(result: Res<Classification>) -> Classification {
    result.unwrap_or_else(|err| {
        warn!("Triage failed, using fallback classification: {err:#}");
        Classification::fallback()
    })
}
