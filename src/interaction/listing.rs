use serde::Serialize;
use tracing::instrument;

use crate::{
    base::types::{MaintenanceRequest, Technician},
    service::db::DbClient,
};

use super::InteractionError;

/// Response body for `GET /tickets`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketList {
    pub tickets: Vec<MaintenanceRequest>,
}

/// Response body for `GET /technicians`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TechnicianList {
    pub technicians: Vec<Technician>,
}

/// All tickets, newest first.
#[instrument(skip_all)]
pub async fn list_tickets(db: &DbClient) -> Result<TicketList, InteractionError> {
    let tickets = db.list_requests().await.map_err(InteractionError::Store)?;
    Ok(TicketList { tickets })
}

/// All technicians, in store order.
#[instrument(skip_all)]
pub async fn list_technicians(db: &DbClient) -> Result<TechnicianList, InteractionError> {
    let technicians = db.list_technicians().await.map_err(InteractionError::Store)?;
    Ok(TechnicianList { technicians })
}
