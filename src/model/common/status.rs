use mongodb::bson::Bson;
use serde::{Deserialize, Serialize};

/// States in the election lifecycle. Only administrators move an election
/// between these.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElectionStatus {
    /// Announced; candidates may register but nobody can vote yet.
    Upcoming,
    /// Polls are open.
    Active,
    /// Polls have closed.
    Completed,
}

impl From<ElectionStatus> for Bson {
    fn from(status: ElectionStatus) -> Self {
        let name = match status {
            ElectionStatus::Upcoming => "upcoming",
            ElectionStatus::Active => "active",
            ElectionStatus::Completed => "completed",
        };
        Bson::String(name.to_string())
    }
}

/// Outcome of checking a voter's identity documents.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Pending,
    Approved,
    Rejected,
}

impl From<VerificationStatus> for Bson {
    fn from(status: VerificationStatus) -> Self {
        let name = match status {
            VerificationStatus::Pending => "pending",
            VerificationStatus::Approved => "approved",
            VerificationStatus::Rejected => "rejected",
        };
        Bson::String(name.to_string())
    }
}

/// Kinds of identity document a voter may register with.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityDocumentType {
    NationalId,
    Passport,
    DriversLicense,
}
