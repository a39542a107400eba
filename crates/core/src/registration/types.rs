use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One child/parent sign-up record.
///
/// Registrations are created on form submission and never updated; the only
/// way one disappears is FIFO eviction once the store exceeds its capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    /// Opaque identifier, generated at creation and never reused.
    pub id: String,
    pub child_name: String,
    pub child_surname: String,
    /// Kept as text: ages arrive as free-form input from the form.
    pub child_age: String,
    pub parent_name: String,
    pub parent_surname: String,
    pub parent_phone: String,
    pub timestamp: DateTime<Utc>,
}

impl Registration {
    /// Creates a record from a validated submission, assigning a fresh id
    /// and creation timestamp.
    pub fn from_submission(submission: NewRegistration) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            child_name: submission.child_name,
            child_surname: submission.child_surname,
            child_age: submission.child_age,
            parent_name: submission.parent_name,
            parent_surname: submission.parent_surname,
            parent_phone: submission.parent_phone,
            timestamp: Utc::now(),
        }
    }

    /// The natural duplicate key: (parent phone, child name, child surname),
    /// compared exactly. No normalization or fuzzy matching, so two entries
    /// only collide when all three fields are byte-for-byte identical.
    pub fn duplicate_key(&self) -> (&str, &str, &str) {
        (&self.parent_phone, &self.child_name, &self.child_surname)
    }
}

/// A validated registration submission, before id/timestamp assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRegistration {
    pub child_name: String,
    pub child_surname: String,
    pub child_age: String,
    pub parent_name: String,
    pub parent_surname: String,
    pub parent_phone: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission() -> NewRegistration {
        NewRegistration {
            child_name: "Mariam".to_string(),
            child_surname: "Giorgadze".to_string(),
            child_age: "12".to_string(),
            parent_name: "Nino".to_string(),
            parent_surname: "Giorgadze".to_string(),
            parent_phone: "+995599123456".to_string(),
        }
    }

    #[test]
    fn test_from_submission_assigns_unique_ids() {
        let a = Registration::from_submission(submission());
        let b = Registration::from_submission(submission());

        assert_ne!(a.id, b.id);
        assert!(!a.id.is_empty());
    }

    #[test]
    fn test_serializes_with_camel_case_field_names() {
        let registration = Registration::from_submission(submission());
        let json = serde_json::to_value(&registration).unwrap();

        assert_eq!(json["childName"], "Mariam");
        assert_eq!(json["parentPhone"], "+995599123456");
        assert!(json.get("child_name").is_none());
    }

    #[test]
    fn test_duplicate_key_covers_phone_and_child_names() {
        let registration = Registration::from_submission(submission());
        assert_eq!(
            registration.duplicate_key(),
            ("+995599123456", "Mariam", "Giorgadze")
        );
    }
}
