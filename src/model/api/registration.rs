use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    api::id::ApiId,
    common::{IdentityDocumentType, VerificationStatus},
    db::registration::VoterRegistration,
};
use crate::voting::is_eligible;

/// A user's voter registration form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub user_id: ApiId,
    pub identity_document_type: IdentityDocumentType,
    pub address: String,
    #[serde(default)]
    pub identity_document_url: Option<String>,
}

/// A verifier's decision on a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationReview {
    pub status: VerificationStatus,
}

/// An API-friendly voter registration description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationDescription {
    pub id: ApiId,
    pub user_id: ApiId,
    pub identity_document_type: IdentityDocumentType,
    pub address: String,
    pub identity_document_url: Option<String>,
    pub verification_status: VerificationStatus,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    /// Whether this registration currently allows the user to vote.
    pub eligible: bool,
}

impl From<VoterRegistration> for RegistrationDescription {
    fn from(registration: VoterRegistration) -> Self {
        let eligible = is_eligible(Some(&registration.registration));
        let id = registration.id.into();
        let registration = registration.registration;
        Self {
            id,
            user_id: registration.user_id.into(),
            identity_document_type: registration.identity_document_type,
            address: registration.address,
            identity_document_url: registration.identity_document_url,
            verification_status: registration.verification_status,
            verified_at: registration.verified_at.map(|at| at.to_chrono()),
            created_at: registration.created_at,
            eligible,
        }
    }
}
