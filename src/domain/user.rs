//! User domain entity and related types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// User domain entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    /// Audit metadata, stamped by the store on write
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: String,
    pub updated_by: String,
}

/// Caller-supplied field set for create and full update.
///
/// Carries no id and no audit fields: the store assigns the id on insert
/// and owns the audit metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDraft {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub address: Option<String>,
    pub phone_number: Option<String>,
}

/// Partial-update payload: every mergeable field optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
}

impl UserPatch {
    /// The email this patch would write, if any.
    ///
    /// An empty string is the no-change sentinel and is never treated
    /// as a candidate email.
    pub fn email_change(&self) -> Option<&str> {
        self.email.as_deref().filter(|e| !e.is_empty())
    }
}

impl User {
    /// Replace all mergeable fields from a full-update draft.
    ///
    /// Id and audit fields are owned by the store and stay untouched.
    pub fn apply_draft(mut self, draft: UserDraft) -> User {
        self.email = draft.email;
        self.first_name = draft.first_name;
        self.last_name = draft.last_name;
        self.birth_date = draft.birth_date;
        self.address = draft.address;
        self.phone_number = draft.phone_number;
        self
    }

    /// Merge a partial-update payload onto this entity.
    ///
    /// A supplied non-empty value overwrites the stored one; an absent
    /// field keeps it. A supplied empty string also keeps the stored
    /// value: the empty string is the no-change sentinel and is never
    /// written over existing data. Id and audit fields stay untouched.
    pub fn apply_patch(mut self, patch: UserPatch) -> User {
        if let Some(email) = patch.email {
            if !email.is_empty() {
                self.email = email;
            }
        }
        if let Some(first_name) = patch.first_name {
            if !first_name.is_empty() {
                self.first_name = first_name;
            }
        }
        if let Some(last_name) = patch.last_name {
            if !last_name.is_empty() {
                self.last_name = last_name;
            }
        }
        if let Some(birth_date) = patch.birth_date {
            self.birth_date = birth_date;
        }
        if let Some(address) = patch.address {
            if !address.is_empty() {
                self.address = Some(address);
            }
        }
        if let Some(phone_number) = patch.phone_number {
            if !phone_number.is_empty() {
                self.phone_number = Some(phone_number);
            }
        }
        self
    }
}

/// User representation returned to API clients.
///
/// Audit fields never leave the service; the id is output-only.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// Unique user identifier
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    /// User email address
    #[schema(example = "user@example.com")]
    pub email: String,
    /// User first name
    #[schema(example = "John")]
    pub first_name: String,
    /// User last name
    #[schema(example = "Doe")]
    pub last_name: String,
    /// Birth date (ISO 8601 date)
    #[schema(example = "1990-01-01")]
    pub birth_date: NaiveDate,
    /// Postal address
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "123 Street, City")]
    pub address: Option<String>,
    /// Phone number (10 digits)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "1234567890")]
    pub phone_number: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            birth_date: user.birth_date,
            address: user.address,
            phone_number: user.phone_number,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored_user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "jane@example.com".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1990, 6, 15).unwrap(),
            address: Some("123 Main St".to_string()),
            phone_number: Some("1234567890".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            created_by: "alice".to_string(),
            updated_by: "alice".to_string(),
        }
    }

    #[test]
    fn patch_overwrites_supplied_fields_and_keeps_the_rest() {
        let user = stored_user();
        let id = user.id;

        let merged = user.apply_patch(UserPatch {
            first_name: Some("John".to_string()),
            ..Default::default()
        });

        assert_eq!(merged.first_name, "John");
        assert_eq!(merged.last_name, "Doe");
        assert_eq!(merged.email, "jane@example.com");
        assert_eq!(merged.id, id);
    }

    #[test]
    fn patch_with_empty_string_keeps_existing_value() {
        let user = stored_user();

        let merged = user.apply_patch(UserPatch {
            email: Some(String::new()),
            first_name: Some(String::new()),
            address: Some(String::new()),
            ..Default::default()
        });

        assert_eq!(merged.email, "jane@example.com");
        assert_eq!(merged.first_name, "Jane");
        assert_eq!(merged.address.as_deref(), Some("123 Main St"));
    }

    #[test]
    fn patch_updates_birth_date_and_optional_fields() {
        let user = stored_user();
        let new_date = NaiveDate::from_ymd_opt(1985, 1, 2).unwrap();

        let merged = user.apply_patch(UserPatch {
            birth_date: Some(new_date),
            address: Some("456 Oak Ave".to_string()),
            phone_number: Some("0987654321".to_string()),
            ..Default::default()
        });

        assert_eq!(merged.birth_date, new_date);
        assert_eq!(merged.address.as_deref(), Some("456 Oak Ave"));
        assert_eq!(merged.phone_number.as_deref(), Some("0987654321"));
    }

    #[test]
    fn patch_never_touches_audit_fields() {
        let user = stored_user();
        let created_at = user.created_at;

        let merged = user.apply_patch(UserPatch {
            email: Some("new@example.com".to_string()),
            ..Default::default()
        });

        assert_eq!(merged.created_at, created_at);
        assert_eq!(merged.created_by, "alice");
        assert_eq!(merged.updated_by, "alice");
    }

    #[test]
    fn draft_replaces_all_mergeable_fields() {
        let user = stored_user();
        let id = user.id;

        let replaced = user.apply_draft(UserDraft {
            email: "john@example.com".to_string(),
            first_name: "John".to_string(),
            last_name: "Smith".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1980, 3, 4).unwrap(),
            address: None,
            phone_number: None,
        });

        assert_eq!(replaced.id, id);
        assert_eq!(replaced.email, "john@example.com");
        assert_eq!(replaced.last_name, "Smith");
        assert_eq!(replaced.address, None);
        assert_eq!(replaced.created_by, "alice");
    }

    #[test]
    fn email_change_ignores_absent_and_empty_values() {
        assert_eq!(UserPatch::default().email_change(), None);
        let empty = UserPatch {
            email: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(empty.email_change(), None);
        let set = UserPatch {
            email: Some("a@b.com".to_string()),
            ..Default::default()
        };
        assert_eq!(set.email_change(), Some("a@b.com"));
    }

    #[test]
    fn response_exposes_no_audit_fields() {
        let user = stored_user();
        let response = UserResponse::from(user.clone());
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["email"], "jane@example.com");
        assert_eq!(json["firstName"], "Jane");
        assert!(json.get("createdAt").is_none());
        assert!(json.get("created_by").is_none());
    }
}
