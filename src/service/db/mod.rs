use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::base::types::{MaintenanceRequest, NewMaintenanceRequest, Res, Technician};

pub mod surreal;

// Traits.

/// Generic database client trait that clients must implement.
///
/// This trait defines the core functionality for storing and retrieving
/// maintenance requests and technicians. Implementing this trait allows
/// different database backends to be used with nebula-api.
#[async_trait]
pub trait GenericDbClient: Send + Sync + 'static {
    /// Lists every maintenance request, newest first.
    async fn list_requests(&self) -> Res<Vec<MaintenanceRequest>>;

    /// Persists a new maintenance request.
    ///
    /// The store generates the identifier and the creation timestamp.
    async fn create_request(&self, request: NewMaintenanceRequest) -> Res<MaintenanceRequest>;

    /// Assigns a technician and schedule time, moving the request to `Scheduled`.
    ///
    /// Returns `None` when no request has the given identifier.
    async fn assign_request(&self, id: &str, technician_id: Uuid, scheduled_at: DateTime<Utc>) -> Res<Option<MaintenanceRequest>>;

    /// Lists every technician.
    async fn list_technicians(&self) -> Res<Vec<Technician>>;
}

// Structs.

/// Database client for nebula-api.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct DbClient {
    inner: Arc<dyn GenericDbClient>,
}

impl Deref for DbClient {
    type Target = dyn GenericDbClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl DbClient {
    pub fn new(inner: Arc<dyn GenericDbClient>) -> Self {
        Self { inner }
    }
}
