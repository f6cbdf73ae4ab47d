use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::{
    base::types::{AssignPayload, MaintenanceRequest, NotifyOutcome, ScheduledNotification, TicketAssignment},
    service::{db::DbClient, notify::NotifyClient},
};

use super::InteractionError;

/// Response of a successful assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignedTicket {
    pub ticket: MaintenanceRequest,
}

/// Assign a technician and schedule time, then notify.
///
/// The prior status is not checked: any ticket, including a completed one, can
/// be (re)scheduled.  The notification outcome never changes the response.
#[instrument(skip(payload, db, notify))]
pub async fn assign_ticket(id: &str, payload: AssignPayload, db: &DbClient, notify: &NotifyClient) -> Result<AssignedTicket, InteractionError> {
    let TicketAssignment { technician_id, scheduled_at } = TicketAssignment::try_from(payload)?;

    let ticket = db
        .assign_request(id, technician_id, scheduled_at)
        .await
        .map_err(InteractionError::Store)?
        .ok_or_else(|| InteractionError::NotFound(format!("Ticket `{id}` not found.")))?;

    info!("Ticket `{id}` scheduled for {scheduled_at}.");

    let notification = ScheduledNotification {
        ticket_id: ticket.id.clone(),
        summary: format!("{} scheduled", ticket.category),
        scheduled_at,
    };

    match notify.notify_scheduled(&notification).await {
        Ok(NotifyOutcome::Skipped) => info!("Notification skipped."),
        Ok(NotifyOutcome::Delivered { status }) => info!("Notification delivered ({status})."),
        Err(err) => warn!("Notification failed: {err:#}"),
    }

    Ok(AssignedTicket { ticket })
}
