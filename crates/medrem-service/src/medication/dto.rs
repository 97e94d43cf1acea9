//! Medication request and response types.
//!
//! Requests carry timestamps as RFC 3339 strings. Responses render every
//! timestamp with [`display_timestamp`] rather than re-encoding RFC 3339.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use medrem_core::error::{AppError, ErrorKind};
use medrem_core::result::AppResult;
use medrem_core::types::{MedicationId, UserId};
use medrem_entity::medication::Medication;

use crate::display::display_timestamp;

/// Message returned when `start_date` or `stop_date` is malformed.
pub const WRONG_DATE_FORMAT: &str = "wrong date format";
/// Message returned when `start_time` is malformed.
pub const WRONG_TIME_FORMAT: &str = "wrong time format";

/// Data for creating a medication.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateMedicationRequest {
    /// Medication name.
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// Quantity per dose.
    #[validate(range(min = 1))]
    pub dosage: i32,
    /// Hours between doses.
    #[validate(range(min = 1))]
    pub time_interval: i32,
    /// First day of the course (RFC 3339).
    pub start_date: String,
    /// Time of the first dose (RFC 3339).
    pub start_time: String,
    /// Last day of the course (RFC 3339).
    pub stop_date: String,
    /// Course length in days.
    #[validate(range(min = 1))]
    pub duration: i32,
    /// Why the medication is taken.
    #[serde(default)]
    pub purpose: String,
    /// Icon category.
    #[serde(default)]
    pub icon: String,
}

/// Data for editing a medication. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateMedicationRequest {
    /// New name.
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    /// New quantity per dose.
    #[validate(range(min = 1))]
    pub dosage: Option<i32>,
    /// New interval in hours.
    #[validate(range(min = 1))]
    pub time_interval: Option<i32>,
    /// New first day (RFC 3339).
    pub start_date: Option<String>,
    /// New first dose time (RFC 3339).
    pub start_time: Option<String>,
    /// New last day (RFC 3339).
    pub stop_date: Option<String>,
    /// New course length in days.
    #[validate(range(min = 1))]
    pub duration: Option<i32>,
    /// New purpose.
    pub purpose: Option<String>,
    /// New icon category.
    pub icon: Option<String>,
    /// Mark the course complete or reopen it.
    pub is_medication_course_complete: Option<bool>,
}

/// A medication as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationResponse {
    pub id: MedicationId,
    pub user_id: UserId,
    pub name: String,
    pub dosage: i32,
    pub time_interval: i32,
    pub start_date: String,
    pub start_time: String,
    pub stop_date: String,
    pub duration: i32,
    pub purpose: String,
    pub icon: String,
    pub is_medication_course_complete: bool,
    pub next_dosage_time: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Medication> for MedicationResponse {
    fn from(m: Medication) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            name: m.name,
            dosage: m.dosage,
            time_interval: m.time_interval,
            start_date: display_timestamp(m.start_date),
            start_time: display_timestamp(m.start_time),
            stop_date: display_timestamp(m.stop_date),
            duration: m.duration,
            purpose: m.purpose,
            icon: m.icon,
            is_medication_course_complete: m.is_medication_course_complete,
            next_dosage_time: display_timestamp(m.next_dosage_time),
            created_at: display_timestamp(m.created_at),
            updated_at: display_timestamp(m.updated_at),
        }
    }
}

/// Parse an RFC 3339 timestamp, normalised to UTC. `message` names the field kind.
pub(crate) fn parse_timestamp(value: &str, message: &'static str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| AppError::with_source(ErrorKind::BadRequest, message, e))
}

/// Turn validator output into a bad-request error.
pub(crate) fn validation_error(errors: validator::ValidationErrors) -> AppError {
    AppError::bad_request(format!("Validation failed: {errors}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateMedicationRequest {
        CreateMedicationRequest {
            name: "Metformin".to_string(),
            dosage: 1,
            time_interval: 12,
            start_date: "2024-01-01T00:00:00Z".to_string(),
            start_time: "2024-01-01T08:00:00Z".to_string(),
            stop_date: "2024-01-31T00:00:00Z".to_string(),
            duration: 30,
            purpose: "diabetes".to_string(),
            icon: "pill".to_string(),
        }
    }

    #[test]
    fn test_parse_timestamp_normalises_offset() {
        let ts = parse_timestamp("2024-01-01T10:00:00+02:00", WRONG_TIME_FORMAT).unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-01-01T08:00:00+00:00");
    }

    #[test]
    fn test_parse_timestamp_rejects_bare_date() {
        let err = parse_timestamp("2013-11-12", WRONG_DATE_FORMAT).unwrap_err();
        assert_eq!(err.kind, ErrorKind::BadRequest);
        assert_eq!(err.message, "wrong date format");
    }

    #[test]
    fn test_validation_rules() {
        assert!(request().validate().is_ok());

        let mut bad = request();
        bad.name = String::new();
        assert!(bad.validate().is_err());

        let mut bad = request();
        bad.time_interval = 0;
        assert!(bad.validate().is_err());

        let update = UpdateMedicationRequest {
            dosage: Some(0),
            ..Default::default()
        };
        assert!(update.validate().is_err());
        assert!(UpdateMedicationRequest::default().validate().is_ok());
    }
}
