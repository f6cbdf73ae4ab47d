use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

/// Minimum number of characters a ticket description must carry.
pub const MIN_DESCRIPTION_CHARS: usize = 5;

/// Maximum number of characters kept from a triage suggestion.
pub const MAX_SUGGESTION_CHARS: usize = 120;

/// Suggestion used when triage is unavailable.
pub const FALLBACK_SUGGESTION: &str = "We received your request and will review shortly.";

// Validation.

/// A client input error; the message is surfaced verbatim to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

// Enumerations.

/// Maintenance category assigned by triage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Category {
    #[serde(rename = "HVAC")]
    Hvac,
    #[serde(rename = "plumbing")]
    Plumbing,
    #[serde(rename = "electrical")]
    Electrical,
    #[serde(rename = "other")]
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Hvac => "HVAC",
            Category::Plumbing => "plumbing",
            Category::Electrical => "electrical",
            Category::Other => "other",
        }
    }
}

impl FromStr for Category {
    type Err = Err;

    fn from_str(s: &str) -> Res<Self> {
        match s.trim().to_lowercase().as_str() {
            "hvac" => Ok(Category::Hvac),
            "plumbing" => Ok(Category::Plumbing),
            "electrical" => Ok(Category::Electrical),
            "other" => Ok(Category::Other),
            _ => Err(anyhow::anyhow!("Unknown category: `{s}`.")),
        }
    }
}

impl TryFrom<String> for Category {
    type Error = Err;

    fn try_from(value: String) -> Res<Self> {
        value.parse()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Urgency assigned by triage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl FromStr for Severity {
    type Err = Err;

    fn from_str(s: &str) -> Res<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            _ => Err(anyhow::anyhow!("Unknown severity: `{s}`.")),
        }
    }
}

impl TryFrom<String> for Severity {
    type Error = Err;

    fn try_from(value: String) -> Res<Self> {
        value.parse()
    }
}

/// Lifecycle of a maintenance request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketStatus {
    Triaged,
    Scheduled,
    Completed,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Triaged => "Triaged",
            TicketStatus::Scheduled => "Scheduled",
            TicketStatus::Completed => "Completed",
        }
    }
}

impl FromStr for TicketStatus {
    type Err = Err;

    fn from_str(s: &str) -> Res<Self> {
        match s {
            "Triaged" => Ok(TicketStatus::Triaged),
            "Scheduled" => Ok(TicketStatus::Scheduled),
            "Completed" => Ok(TicketStatus::Completed),
            _ => Err(anyhow::anyhow!("Unknown ticket status: `{s}`.")),
        }
    }
}

// Triage.

/// Result of triaging a ticket description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub category: Category,
    pub severity: Severity,
    pub suggestion: String,
}

impl Classification {
    /// The classification substituted whenever triage fails.
    pub fn fallback() -> Self {
        Self {
            category: Category::Other,
            severity: Severity::Medium,
            suggestion: FALLBACK_SUGGESTION.to_string(),
        }
    }

    /// Parse a model payload, normalizing enum casing and clamping the suggestion.
    pub fn from_model_output(content: &str) -> Res<Self> {
        let mut classification: Classification = serde_json::from_str(content.trim())?;

        if classification.suggestion.chars().count() > MAX_SUGGESTION_CHARS {
            classification.suggestion = classification.suggestion.chars().take(MAX_SUGGESTION_CHARS).collect();
        }

        Ok(classification)
    }
}

// Records.

/// A tenant-submitted maintenance request, as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceRequest {
    pub id: String,
    pub description: String,
    pub status: TicketStatus,
    pub category: Category,
    pub severity: Severity,
    pub photo_url: Option<String>,
    pub tenant_id: Option<Uuid>,
    pub property_id: Option<Uuid>,
    pub technician_id: Option<Uuid>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// The fields written when a request is first persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMaintenanceRequest {
    pub description: String,
    pub status: TicketStatus,
    pub category: Category,
    pub severity: Severity,
    pub photo_url: Option<String>,
    pub tenant_id: Option<Uuid>,
    pub property_id: Option<Uuid>,
}

impl NewMaintenanceRequest {
    /// Build a freshly triaged request from a validated submission.
    pub fn triaged(submission: TicketSubmission, classification: &Classification) -> Self {
        Self {
            description: submission.text,
            status: TicketStatus::Triaged,
            category: classification.category,
            severity: classification.severity,
            photo_url: submission.photo_url,
            tenant_id: submission.tenant_id,
            property_id: submission.property_id,
        }
    }
}

/// A technician who can be assigned to requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Technician {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub specialty: Option<String>,
}

// Payloads.

/// Raw body of `POST /tickets/ingest`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestPayload {
    pub text: Option<String>,
    pub photo_url: Option<String>,
    pub tenant_id: Option<String>,
    pub property_id: Option<String>,
}

/// A validated ticket submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketSubmission {
    pub text: String,
    pub photo_url: Option<String>,
    pub tenant_id: Option<Uuid>,
    pub property_id: Option<Uuid>,
}

impl TryFrom<IngestPayload> for TicketSubmission {
    type Error = ValidationError;

    fn try_from(payload: IngestPayload) -> Result<Self, ValidationError> {
        let text = payload.text.ok_or_else(|| ValidationError::new("`text` is required."))?;

        if text.chars().count() < MIN_DESCRIPTION_CHARS {
            return Err(ValidationError::new(format!("`text` must be at least {MIN_DESCRIPTION_CHARS} characters.")));
        }

        let photo_url = payload
            .photo_url
            .map(|url| {
                reqwest::Url::parse(&url)
                    .map(|_| url)
                    .map_err(|e| ValidationError::new(format!("`photoUrl` is not a valid URL: {e}.")))
            })
            .transpose()?;

        Ok(Self {
            text,
            photo_url,
            tenant_id: parse_optional_uuid("tenantId", payload.tenant_id)?,
            property_id: parse_optional_uuid("propertyId", payload.property_id)?,
        })
    }
}

/// Raw body of `POST /tickets/{id}/assign`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignPayload {
    pub technician_id: Option<String>,
    pub scheduled_at: Option<String>,
}

/// A validated assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketAssignment {
    pub technician_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
}

impl TryFrom<AssignPayload> for TicketAssignment {
    type Error = ValidationError;

    fn try_from(payload: AssignPayload) -> Result<Self, ValidationError> {
        let technician_id = payload.technician_id.ok_or_else(|| ValidationError::new("`technicianId` is required."))?;
        let technician_id = Uuid::parse_str(&technician_id).map_err(|e| ValidationError::new(format!("`technicianId` is not a valid UUID: {e}.")))?;

        let scheduled_at = payload.scheduled_at.ok_or_else(|| ValidationError::new("`scheduledAt` is required."))?;
        let scheduled_at = DateTime::parse_from_rfc3339(&scheduled_at)
            .map_err(|e| ValidationError::new(format!("`scheduledAt` is not an ISO-8601 timestamp: {e}.")))?
            .with_timezone(&Utc);

        Ok(Self { technician_id, scheduled_at })
    }
}

/// Body posted to the scheduling webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledNotification {
    pub ticket_id: String,
    pub summary: String,
    pub scheduled_at: DateTime<Utc>,
}

/// What happened to a notification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// No webhook is configured.
    Skipped,
    /// The webhook answered with this HTTP status.
    Delivered { status: u16 },
}

fn parse_optional_uuid(field: &str, value: Option<String>) -> Result<Option<Uuid>, ValidationError> {
    value
        .map(|v| Uuid::parse_str(&v).map_err(|e| ValidationError::new(format!("`{field}` is not a valid UUID: {e}."))))
        .transpose()
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(text: &str) -> IngestPayload {
        IngestPayload {
            text: Some(text.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_submission_requires_text() {
        let err = TicketSubmission::try_from(IngestPayload::default()).unwrap_err();
        assert!(err.to_string().contains("text"));
    }

    #[test]
    fn test_submission_rejects_short_text() {
        assert!(TicketSubmission::try_from(payload("leak")).is_err());
        assert!(TicketSubmission::try_from(payload("")).is_err());
        assert!(TicketSubmission::try_from(payload("leaks")).is_ok());
    }

    #[test]
    fn test_submission_counts_characters_not_bytes() {
        // Four characters, ten bytes.
        assert!(TicketSubmission::try_from(payload("水漏れ!")).is_err());
    }

    #[test]
    fn test_submission_validates_optional_fields() {
        let mut p = payload("The heater is broken");
        p.photo_url = Some("not a url".to_string());
        assert!(TicketSubmission::try_from(p).unwrap_err().to_string().contains("photoUrl"));

        let mut p = payload("The heater is broken");
        p.tenant_id = Some("1234".to_string());
        assert!(TicketSubmission::try_from(p).unwrap_err().to_string().contains("tenantId"));

        let mut p = payload("The heater is broken");
        p.property_id = Some("abc".to_string());
        assert!(TicketSubmission::try_from(p).unwrap_err().to_string().contains("propertyId"));
    }

    #[test]
    fn test_submission_passes_optional_fields_through() {
        let tenant = Uuid::new_v4();
        let p = IngestPayload {
            text: Some("The heater is broken".to_string()),
            photo_url: Some("https://example.com/heater.jpg".to_string()),
            tenant_id: Some(tenant.to_string()),
            property_id: None,
        };

        let submission = TicketSubmission::try_from(p).unwrap();

        assert_eq!(submission.photo_url.as_deref(), Some("https://example.com/heater.jpg"));
        assert_eq!(submission.tenant_id, Some(tenant));
        assert_eq!(submission.property_id, None);
    }

    #[test]
    fn test_ingest_payload_accepts_explicit_nulls() {
        let p: IngestPayload = serde_json::from_str(r#"{"text":"Sink is leaking badly","photoUrl":null,"tenantId":null}"#).unwrap();
        let submission = TicketSubmission::try_from(p).unwrap();
        assert_eq!(submission.photo_url, None);
        assert_eq!(submission.tenant_id, None);
    }

    #[test]
    fn test_assignment_validation() {
        let technician = Uuid::new_v4();

        let ok = TicketAssignment::try_from(AssignPayload {
            technician_id: Some(technician.to_string()),
            scheduled_at: Some("2025-03-01T09:30:00Z".to_string()),
        })
        .unwrap();
        assert_eq!(ok.technician_id, technician);
        assert_eq!(ok.scheduled_at.to_rfc3339(), "2025-03-01T09:30:00+00:00");

        let offset = TicketAssignment::try_from(AssignPayload {
            technician_id: Some(technician.to_string()),
            scheduled_at: Some("2025-03-01T10:30:00+01:00".to_string()),
        })
        .unwrap();
        assert_eq!(offset.scheduled_at, ok.scheduled_at);

        assert!(
            TicketAssignment::try_from(AssignPayload {
                technician_id: Some("nope".to_string()),
                scheduled_at: Some("2025-03-01T09:30:00Z".to_string()),
            })
            .is_err()
        );
        assert!(
            TicketAssignment::try_from(AssignPayload {
                technician_id: Some(technician.to_string()),
                scheduled_at: Some("tomorrow".to_string()),
            })
            .is_err()
        );
        assert!(
            TicketAssignment::try_from(AssignPayload {
                technician_id: Some(technician.to_string()),
                scheduled_at: None,
            })
            .is_err()
        );
    }

    #[test]
    fn test_classification_parses_model_output() {
        let c = Classification::from_model_output(r#"{"category":"plumbing","severity":"high","suggestion":"Shut off the valve."}"#).unwrap();
        assert_eq!(c.category, Category::Plumbing);
        assert_eq!(c.severity, Severity::High);
        assert_eq!(c.suggestion, "Shut off the valve.");
    }

    #[test]
    fn test_classification_normalizes_casing() {
        let c = Classification::from_model_output(r#"{"category":"hvac","severity":"Low","suggestion":"Replace the filter."}"#).unwrap();
        assert_eq!(c.category, Category::Hvac);
        assert_eq!(c.severity, Severity::Low);
    }

    #[test]
    fn test_classification_clamps_suggestion() {
        let long = "a".repeat(300);
        let c = Classification::from_model_output(&format!(r#"{{"category":"other","severity":"low","suggestion":"{long}"}}"#)).unwrap();
        assert_eq!(c.suggestion.chars().count(), MAX_SUGGESTION_CHARS);
    }

    #[test]
    fn test_classification_rejects_bad_output() {
        assert!(Classification::from_model_output("not json").is_err());
        assert!(Classification::from_model_output(r#"{"category":"roofing","severity":"low","suggestion":"x"}"#).is_err());
        assert!(Classification::from_model_output(r#"{"category":"other","severity":"urgent","suggestion":"x"}"#).is_err());
        assert!(Classification::from_model_output(r#"{"category":"other","severity":"low"}"#).is_err());
    }

    #[test]
    fn test_classification_serializes_wire_names() {
        let value = serde_json::to_value(Classification {
            category: Category::Hvac,
            severity: Severity::High,
            suggestion: "Call a technician.".to_string(),
        })
        .unwrap();

        assert_eq!(value, serde_json::json!({ "category": "HVAC", "severity": "high", "suggestion": "Call a technician." }));
    }

    #[test]
    fn test_fallback_classification() {
        let c = Classification::fallback();
        assert_eq!(c.category, Category::Other);
        assert_eq!(c.severity, Severity::Medium);
        assert_eq!(c.suggestion, FALLBACK_SUGGESTION);
    }
}
