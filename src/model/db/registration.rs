use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use mongodb::bson::{serde_helpers::chrono_datetime_as_bson_datetime, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

use crate::model::{
    common::{IdentityDocumentType, VerificationStatus},
    mongodb::Id,
};

/// Core voter registration data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterRegistrationCore {
    /// The registering user. Each user has at most one registration.
    pub user_id: Id,
    pub identity_document_type: IdentityDocumentType,
    pub address: String,
    pub identity_document_url: Option<String>,
    /// Only an approved registration lets the user vote.
    pub verification_status: VerificationStatus,
    /// When the registration was last reviewed.
    #[serde(default)]
    pub verified_at: Option<BsonDateTime>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl VoterRegistrationCore {
    /// A new registration awaiting verification.
    pub fn new(
        user_id: Id,
        identity_document_type: IdentityDocumentType,
        address: String,
        identity_document_url: Option<String>,
    ) -> Self {
        Self {
            user_id,
            identity_document_type,
            address,
            identity_document_url,
            verification_status: VerificationStatus::Pending,
            verified_at: None,
            created_at: Utc::now(),
        }
    }
}

/// A voter registration without an ID.
pub type NewVoterRegistration = VoterRegistrationCore;

/// A voter registration from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterRegistration {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub registration: VoterRegistrationCore,
}

impl Deref for VoterRegistration {
    type Target = VoterRegistrationCore;

    fn deref(&self) -> &Self::Target {
        &self.registration
    }
}

impl DerefMut for VoterRegistration {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.registration
    }
}

/// Example data for tests.
#[cfg(test)]
pub mod examples {
    use super::*;

    impl VoterRegistrationCore {
        pub fn example(user_id: Id, status: VerificationStatus) -> Self {
            let mut registration = Self::new(
                user_id,
                IdentityDocumentType::NationalId,
                "12 Lodge Road, Ikeja".to_string(),
                None,
            );
            registration.verification_status = status;
            registration
        }
    }
}
