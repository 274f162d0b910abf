//! Guest domain model.
//!
//! Guests belong to exactly one tenant. A guest id alone is never
//! sufficient authorization: every single-record operation takes the
//! caller-asserted tenant id and verifies it against the stored one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PanelError;

/// RSVP answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attendance {
    Yes,
    No,
    Maybe,
}

impl Attendance {
    /// Case-insensitive parse; anything outside `{yes,no,maybe}` is a
    /// validation error.
    pub fn parse(value: &str) -> Result<Self, PanelError> {
        match value.trim().to_lowercase().as_str() {
            "yes" => Ok(Attendance::Yes),
            "no" => Ok(Attendance::No),
            "maybe" => Ok(Attendance::Maybe),
            other => Err(PanelError::validation(format!(
                "attendance must be one of yes/no/maybe, got '{other}'"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Attendance::Yes => "yes",
            Attendance::No => "no",
            Attendance::Maybe => "maybe",
        }
    }

    /// Display form for exports ("Yes"/"No"/"Maybe").
    pub fn title_case(&self) -> &'static str {
        match self {
            Attendance::Yes => "Yes",
            Attendance::No => "No",
            Attendance::Maybe => "Maybe",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Guest {
    pub id: i64,
    /// Owning wedding; immutable after creation.
    pub tenant_id: i64,
    pub name: String,
    /// Free text, e.g. "Friend" or "Aunt".
    pub relationship: String,
    pub attendance: Attendance,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGuest {
    pub tenant_id: i64,
    pub name: String,
    pub relationship: String,
    pub attendance: Attendance,
    pub message: Option<String>,
}

/// Fields that can be patched on an existing guest. `tenant_id` is
/// deliberately absent: ownership never changes.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateGuest {
    pub name: Option<String>,
    pub relationship: Option<String>,
    pub attendance: Option<Attendance>,
    pub message: Option<String>,
}

impl UpdateGuest {
    /// Merge this patch onto a loaded row, producing the full mutable
    /// field set to write back.
    pub fn apply_to(self, mut current: Guest) -> Guest {
        if let Some(v) = self.name {
            current.name = v;
        }
        if let Some(v) = self.relationship {
            current.relationship = v;
        }
        if let Some(v) = self.attendance {
            current.attendance = v;
        }
        if let Some(v) = self.message {
            current.message = Some(v);
        }
        current
    }
}

/// List filters. `tenant_id` is a required field, not an option: the
/// type itself guarantees that guest listings cannot cross tenants.
#[derive(Debug, Clone)]
pub struct GuestFilters {
    pub tenant_id: i64,
    /// Case-insensitive substring match over name and relationship.
    pub search: Option<String>,
    pub attendance: Option<Attendance>,
}

impl GuestFilters {
    pub fn for_tenant(tenant_id: i64) -> Self {
        Self {
            tenant_id,
            search: None,
            attendance: None,
        }
    }
}

/// Aggregate RSVP counts for one tenant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuestStats {
    pub total: u64,
    pub attending: u64,
    pub not_attending: u64,
    pub maybe: u64,
}

/// Guest row denormalized with the owning tenant's display fields,
/// returned by the cross-tenant assistant search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestWithWedding {
    pub guest: Guest,
    pub bride_name: String,
    pub groom_name: String,
    pub wedding_date: DateTime<Utc>,
}
