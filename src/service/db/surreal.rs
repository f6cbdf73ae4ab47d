//! SurrealDB implementation for nebula-api data storage.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::{
    Surreal,
    engine::any::{self, Any},
    opt::auth::Root,
    sql::{Datetime, Thing},
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::base::{
    config::Config,
    types::{MaintenanceRequest, NewMaintenanceRequest, Res, Technician, TicketStatus, Void},
};

use super::{DbClient, GenericDbClient};

const REQUEST_TABLE: &str = "request";
const TECHNICIAN_TABLE: &str = "technician";

const SCHEMA: &str = r#"
DEFINE TABLE IF NOT EXISTS request SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS description ON request TYPE string ASSERT string::len($value) >= 5;
DEFINE FIELD IF NOT EXISTS status ON request TYPE string ASSERT $value IN ['Triaged', 'Scheduled', 'Completed'];
DEFINE FIELD IF NOT EXISTS category ON request TYPE string;
DEFINE FIELD IF NOT EXISTS severity ON request TYPE string;
DEFINE FIELD IF NOT EXISTS photo_url ON request TYPE option<string>;
DEFINE FIELD IF NOT EXISTS tenant_id ON request TYPE option<string>;
DEFINE FIELD IF NOT EXISTS property_id ON request TYPE option<string>;
DEFINE FIELD IF NOT EXISTS technician_id ON request TYPE option<string>;
DEFINE FIELD IF NOT EXISTS scheduled_at ON request TYPE option<datetime>;
DEFINE FIELD IF NOT EXISTS created_at ON request TYPE datetime DEFAULT time::now() READONLY;
DEFINE INDEX IF NOT EXISTS request_created_at ON request FIELDS created_at;

DEFINE TABLE IF NOT EXISTS technician SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS name ON technician TYPE string;
DEFINE FIELD IF NOT EXISTS phone ON technician TYPE option<string>;
DEFINE FIELD IF NOT EXISTS email ON technician TYPE option<string>;
DEFINE FIELD IF NOT EXISTS specialty ON technician TYPE option<string>;
"#;

// Extra methods on `DbClient` applied by the surreal implementation.

impl DbClient {
    /// Connects to the SurrealDB instance named in the configuration.
    pub async fn surreal(config: &Config) -> Res<Self> {
        let client = SurrealDbClient::new(config).await?;
        Ok(Self { inner: Arc::new(client) })
    }

    /// Creates a client backed by an in-memory SurrealDB engine.
    pub async fn surreal_memory() -> Res<Self> {
        let client = SurrealDbClient::memory().await?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Records.

/// A maintenance request row in the database.
#[derive(Debug, Deserialize)]
struct SurrealRequest {
    id: Option<Thing>,
    description: String,
    status: String,
    category: String,
    severity: String,
    photo_url: Option<String>,
    tenant_id: Option<String>,
    property_id: Option<String>,
    technician_id: Option<String>,
    scheduled_at: Option<Datetime>,
    created_at: Option<Datetime>,
}

/// Content written when a request is created; `created_at` comes from the field default.
#[derive(Debug, Serialize)]
struct SurrealNewRequest {
    description: String,
    status: String,
    category: String,
    severity: String,
    photo_url: Option<String>,
    tenant_id: Option<String>,
    property_id: Option<String>,
}

impl From<NewMaintenanceRequest> for SurrealNewRequest {
    fn from(request: NewMaintenanceRequest) -> Self {
        Self {
            description: request.description,
            status: request.status.as_str().to_string(),
            category: request.category.as_str().to_string(),
            severity: request.severity.as_str().to_string(),
            photo_url: request.photo_url,
            tenant_id: request.tenant_id.map(|id| id.to_string()),
            property_id: request.property_id.map(|id| id.to_string()),
        }
    }
}

/// Patch merged into a request on assignment.
#[derive(Debug, Serialize)]
struct SurrealAssignment {
    technician_id: String,
    scheduled_at: Datetime,
    status: String,
}

/// A technician row in the database.
#[derive(Debug, Deserialize)]
struct SurrealTechnician {
    id: Option<Thing>,
    name: String,
    phone: Option<String>,
    email: Option<String>,
    specialty: Option<String>,
}

impl TryFrom<SurrealRequest> for MaintenanceRequest {
    type Error = anyhow::Error;

    fn try_from(row: SurrealRequest) -> Res<Self> {
        let id = row.id.ok_or_else(|| anyhow::anyhow!("Request row is missing its id."))?;
        let created_at = row.created_at.ok_or_else(|| anyhow::anyhow!("Request `{id}` is missing `created_at`."))?;

        Ok(Self {
            id: id.id.to_raw(),
            description: row.description,
            status: row.status.parse()?,
            category: row.category.parse()?,
            severity: row.severity.parse()?,
            photo_url: row.photo_url,
            tenant_id: parse_uuid(row.tenant_id)?,
            property_id: parse_uuid(row.property_id)?,
            technician_id: parse_uuid(row.technician_id)?,
            scheduled_at: row.scheduled_at.map(DateTime::<Utc>::from),
            created_at: DateTime::<Utc>::from(created_at),
        })
    }
}

impl TryFrom<SurrealTechnician> for Technician {
    type Error = anyhow::Error;

    fn try_from(row: SurrealTechnician) -> Res<Self> {
        let id = row.id.ok_or_else(|| anyhow::anyhow!("Technician row is missing its id."))?;

        Ok(Self {
            id: id.id.to_raw(),
            name: row.name,
            phone: row.phone,
            email: row.email,
            specialty: row.specialty,
        })
    }
}

fn parse_uuid(value: Option<String>) -> Res<Option<Uuid>> {
    Ok(value.map(|v| Uuid::parse_str(&v)).transpose()?)
}

// Specific implementations.

/// SurrealDB client implementation.
#[derive(Clone)]
pub struct SurrealDbClient {
    db: Surreal<Any>,
}

impl SurrealDbClient {
    /// Connect, authenticate, and define the schema.
    #[instrument(name = "SurrealDbClient::new", skip_all)]
    pub async fn new(config: &Config) -> Res<Self> {
        let db = any::connect(config.db_endpoint.as_str()).await?;

        // Authenticate with the database using the provided username and password.
        db.signin(Root {
            username: &config.db_username,
            password: &config.db_password,
        })
        .await?;

        db.use_ns(&config.db_namespace).use_db(&config.db_database).await?;

        let client = Self { db };
        client.define_schema().await?;

        info!("Database initialized successfully.");

        Ok(client)
    }

    /// Create an unauthenticated in-memory instance.
    #[instrument(name = "SurrealDbClient::memory", skip_all)]
    pub async fn memory() -> Res<Self> {
        let db = any::connect("mem://").await?;
        db.use_ns("nebula").use_db("api").await?;

        let client = Self { db };
        client.define_schema().await?;

        Ok(client)
    }

    async fn define_schema(&self) -> Void {
        self.db.query(SCHEMA).await?.check()?;
        Ok(())
    }
}

#[async_trait]
impl GenericDbClient for SurrealDbClient {
    #[instrument(name = "SurrealDbClient::list_requests", skip_all)]
    async fn list_requests(&self) -> Res<Vec<MaintenanceRequest>> {
        let rows: Vec<SurrealRequest> = self.db.query("SELECT * FROM request ORDER BY created_at DESC").await?.take(0)?;

        info!("Loaded {} requests.", rows.len());

        rows.into_iter().map(MaintenanceRequest::try_from).collect()
    }

    #[instrument(name = "SurrealDbClient::create_request", skip_all)]
    async fn create_request(&self, request: NewMaintenanceRequest) -> Res<MaintenanceRequest> {
        let row: Option<SurrealRequest> = self.db.create(REQUEST_TABLE).content(SurrealNewRequest::from(request)).await?;
        let row = row.ok_or_else(|| anyhow::anyhow!("Database returned no row for the created request."))?;

        let request = MaintenanceRequest::try_from(row)?;
        info!("Request `{}` created.", request.id);

        Ok(request)
    }

    #[instrument(name = "SurrealDbClient::assign_request", skip(self))]
    async fn assign_request(&self, id: &str, technician_id: Uuid, scheduled_at: DateTime<Utc>) -> Res<Option<MaintenanceRequest>> {
        let existing: Option<SurrealRequest> = self.db.select((REQUEST_TABLE, id)).await?;

        if existing.is_none() {
            info!("Request `{}` not found.", id);
            return Ok(None);
        }

        let patch = SurrealAssignment {
            technician_id: technician_id.to_string(),
            scheduled_at: Datetime::from(scheduled_at),
            status: TicketStatus::Scheduled.as_str().to_string(),
        };

        let row: Option<SurrealRequest> = self.db.update((REQUEST_TABLE, id)).merge(patch).await?;

        row.map(MaintenanceRequest::try_from).transpose()
    }

    #[instrument(name = "SurrealDbClient::list_technicians", skip_all)]
    async fn list_technicians(&self) -> Res<Vec<Technician>> {
        let rows: Vec<SurrealTechnician> = self.db.select(TECHNICIAN_TABLE).await?;

        rows.into_iter().map(Technician::try_from).collect()
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::base::types::{Category, Severity};

    fn new_request(description: &str) -> NewMaintenanceRequest {
        NewMaintenanceRequest {
            description: description.to_string(),
            status: TicketStatus::Triaged,
            category: Category::Plumbing,
            severity: Severity::High,
            photo_url: None,
            tenant_id: None,
            property_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_request_sets_id_and_created_at() {
        let client = SurrealDbClient::memory().await.unwrap();
        let tenant = Uuid::new_v4();

        let mut request = new_request("Sink is leaking badly");
        request.tenant_id = Some(tenant);
        request.photo_url = Some("https://example.com/sink.jpg".to_string());

        let before = Utc::now();
        let created = client.create_request(request).await.unwrap();

        assert!(!created.id.is_empty());
        assert_eq!(created.description, "Sink is leaking badly");
        assert_eq!(created.status, TicketStatus::Triaged);
        assert_eq!(created.category, Category::Plumbing);
        assert_eq!(created.severity, Severity::High);
        assert_eq!(created.tenant_id, Some(tenant));
        assert_eq!(created.property_id, None);
        assert_eq!(created.photo_url.as_deref(), Some("https://example.com/sink.jpg"));
        assert_eq!(created.technician_id, None);
        assert_eq!(created.scheduled_at, None);
        assert!(created.created_at >= before - chrono::Duration::seconds(1));
    }

    #[tokio::test]
    async fn test_schema_rejects_short_description() {
        let client = SurrealDbClient::memory().await.unwrap();

        assert!(client.create_request(new_request("leak")).await.is_err());
        assert!(client.list_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_requests_newest_first() {
        let client = SurrealDbClient::memory().await.unwrap();

        for description in ["First request", "Second request", "Third request"] {
            client.create_request(new_request(description)).await.unwrap();
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let requests = client.list_requests().await.unwrap();
        let descriptions = requests.iter().map(|r| r.description.as_str()).collect::<Vec<_>>();

        assert_eq!(descriptions, vec!["Third request", "Second request", "First request"]);
        assert!(requests.windows(2).all(|w| w[0].created_at > w[1].created_at));
    }

    #[tokio::test]
    async fn test_assign_request_schedules() {
        let client = SurrealDbClient::memory().await.unwrap();
        let created = client.create_request(new_request("Breaker keeps tripping")).await.unwrap();

        let technician = Uuid::new_v4();
        let scheduled_at = DateTime::parse_from_rfc3339("2025-03-01T09:30:00Z").unwrap().with_timezone(&Utc);

        let assigned = client.assign_request(&created.id, technician, scheduled_at).await.unwrap().unwrap();

        assert_eq!(assigned.id, created.id);
        assert_eq!(assigned.status, TicketStatus::Scheduled);
        assert_eq!(assigned.technician_id, Some(technician));
        assert_eq!(assigned.scheduled_at, Some(scheduled_at));
        assert_eq!(assigned.created_at, created.created_at);
        assert_eq!(assigned.description, created.description);
    }

    #[tokio::test]
    async fn test_assign_reschedules_completed_request() {
        let client = SurrealDbClient::memory().await.unwrap();
        let created = client.create_request(new_request("Dishwasher will not drain")).await.unwrap();

        let first_technician = Uuid::new_v4();
        let first_at = DateTime::parse_from_rfc3339("2025-03-01T09:30:00Z").unwrap().with_timezone(&Utc);
        let scheduled = client.assign_request(&created.id, first_technician, first_at).await.unwrap().unwrap();
        assert_eq!(scheduled.status, TicketStatus::Scheduled);

        #[derive(Serialize)]
        struct StatusPatch {
            status: String,
        }

        let completed: Option<SurrealRequest> = client
            .db
            .update((REQUEST_TABLE, created.id.as_str()))
            .merge(StatusPatch {
                status: TicketStatus::Completed.as_str().to_string(),
            })
            .await
            .unwrap();
        assert_eq!(MaintenanceRequest::try_from(completed.unwrap()).unwrap().status, TicketStatus::Completed);

        let second_technician = Uuid::new_v4();
        let second_at = DateTime::parse_from_rfc3339("2025-03-08T14:00:00Z").unwrap().with_timezone(&Utc);
        let rescheduled = client.assign_request(&created.id, second_technician, second_at).await.unwrap().unwrap();

        assert_eq!(rescheduled.status, TicketStatus::Scheduled);
        assert_eq!(rescheduled.technician_id, Some(second_technician));
        assert_eq!(rescheduled.scheduled_at, Some(second_at));
        assert_eq!(rescheduled.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_assign_unknown_request_returns_none() {
        let client = SurrealDbClient::memory().await.unwrap();

        let result = client.assign_request("does-not-exist", Uuid::new_v4(), Utc::now()).await.unwrap();

        assert!(result.is_none());
        assert!(client.list_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_technicians() {
        let client = SurrealDbClient::memory().await.unwrap();

        #[derive(Serialize)]
        struct NewTechnician {
            name: String,
            phone: Option<String>,
            email: Option<String>,
            specialty: Option<String>,
        }

        let _: Option<SurrealTechnician> = client
            .db
            .create(TECHNICIAN_TABLE)
            .content(NewTechnician {
                name: "Dana Ortiz".to_string(),
                phone: Some("555-0100".to_string()),
                email: None,
                specialty: Some("plumbing".to_string()),
            })
            .await
            .unwrap();

        let technicians = client.list_technicians().await.unwrap();

        assert_eq!(technicians.len(), 1);
        assert_eq!(technicians[0].name, "Dana Ortiz");
        assert_eq!(technicians[0].specialty.as_deref(), Some("plumbing"));
        assert!(!technicians[0].id.is_empty());
    }

    #[tokio::test]
    async fn test_db_client_wrapper() {
        let db = DbClient::surreal_memory().await.unwrap();

        db.create_request(new_request("Window will not close")).await.unwrap();

        assert_eq!(db.list_requests().await.unwrap().len(), 1);
    }
}
