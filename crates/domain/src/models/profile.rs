//! Family member profile models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use super::UnknownVariant;

/// Relationship of a family member to the visited parent.
///
/// The wire and storage representation is the Hebrew label the family
/// actually uses; the registration menu keys map onto these in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relationship {
    #[serde(rename = "בן")]
    Son,
    #[serde(rename = "בת")]
    Daughter,
    #[serde(rename = "נכד")]
    Grandson,
    #[serde(rename = "נכדה")]
    Granddaughter,
    #[serde(rename = "נינה")]
    GreatGranddaughter,
    #[serde(rename = "קרוב")]
    Relative,
    #[serde(rename = "קרובה")]
    RelativeF,
}

impl Relationship {
    /// All relationships in registration-menu order (keys 1..7).
    pub const ALL: [Relationship; 7] = [
        Relationship::Son,
        Relationship::Daughter,
        Relationship::Grandson,
        Relationship::Granddaughter,
        Relationship::GreatGranddaughter,
        Relationship::Relative,
        Relationship::RelativeF,
    ];

    /// Storage value (the short Hebrew form).
    pub fn as_str(&self) -> &'static str {
        match self {
            Relationship::Son => "בן",
            Relationship::Daughter => "בת",
            Relationship::Grandson => "נכד",
            Relationship::Granddaughter => "נכדה",
            Relationship::GreatGranddaughter => "נינה",
            Relationship::Relative => "קרוב",
            Relationship::RelativeF => "קרובה",
        }
    }

    /// Human-facing menu label (the long form where it differs).
    pub fn label(&self) -> &'static str {
        match self {
            Relationship::Relative => "קרוב משפחה",
            Relationship::RelativeF => "קרובת משפחה",
            other => other.as_str(),
        }
    }
}

impl FromStr for Relationship {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Relationship::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownVariant::new("relationship", s))
    }
}

impl std::fmt::Display for Relationship {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A family member's identity record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FamilyProfile {
    pub id: Uuid,
    /// Canonical `+`-prefixed E.164 phone.
    pub phone: String,
    pub name: String,
    pub hebrew_name: Option<String>,
    pub relationship: Relationship,
    pub is_admin: bool,
    pub last_visit_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FamilyProfile {
    /// Days since the last recorded visit, if any.
    pub fn days_since_last_visit(&self, now: DateTime<Utc>) -> Option<i64> {
        self.last_visit_at
            .map(|last| (now - last).num_days().max(0))
    }

    /// Whether this member is considered inactive against a day threshold.
    pub fn is_inactive(&self, now: DateTime<Utc>, threshold_days: i64) -> bool {
        match self.days_since_last_visit(now) {
            Some(days) => days >= threshold_days,
            None => true,
        }
    }
}

/// Request to create or update the requester's own profile.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpsertProfileRequest {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(max = 100, message = "hebrew_name must be at most 100 characters"))]
    pub hebrew_name: Option<String>,

    pub relationship: Relationship,
}

/// Request to toggle a profile's administrator flag.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SetAdminRequest {
    pub is_admin: bool,
}

/// Profile enriched with activity statistics for the coordinator dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MemberActivity {
    #[serde(flatten)]
    pub profile: FamilyProfile,
    pub total_bookings: i64,
    pub days_since_last_visit: Option<i64>,
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn profile(last_visit_at: Option<DateTime<Utc>>) -> FamilyProfile {
        let now = Utc::now();
        FamilyProfile {
            id: Uuid::new_v4(),
            phone: "+972501234567".to_string(),
            name: "Yosef Cohen".to_string(),
            hebrew_name: None,
            relationship: Relationship::Son,
            is_admin: false,
            last_visit_at,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_relationship_roundtrip() {
        for r in Relationship::ALL {
            assert_eq!(r.as_str().parse::<Relationship>().unwrap(), r);
        }
    }

    #[test]
    fn test_relationship_unknown_value() {
        assert!("cousin".parse::<Relationship>().is_err());
    }

    #[test]
    fn test_relationship_labels() {
        assert_eq!(Relationship::Son.label(), "בן");
        assert_eq!(Relationship::Relative.label(), "קרוב משפחה");
        assert_eq!(Relationship::RelativeF.label(), "קרובת משפחה");
    }

    #[test]
    fn test_relationship_serde_uses_hebrew() {
        let json = serde_json::to_string(&Relationship::Granddaughter).unwrap();
        assert_eq!(json, "\"נכדה\"");
    }

    #[test]
    fn test_days_since_last_visit() {
        let now = Utc::now();
        let p = profile(Some(now - Duration::days(10)));
        assert_eq!(p.days_since_last_visit(now), Some(10));
        assert!(profile(None).days_since_last_visit(now).is_none());
    }

    #[test]
    fn test_is_inactive() {
        let now = Utc::now();
        assert!(profile(None).is_inactive(now, 14));
        assert!(profile(Some(now - Duration::days(20))).is_inactive(now, 14));
        assert!(!profile(Some(now - Duration::days(3))).is_inactive(now, 14));
    }
}
