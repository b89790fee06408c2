use crate::model::{common::VerificationStatus, db::registration::VoterRegistrationCore};

/// A user may vote iff they have a registration and it has been approved.
pub fn is_eligible(registration: Option<&VoterRegistrationCore>) -> bool {
    registration
        .map(|r| r.verification_status == VerificationStatus::Approved)
        .unwrap_or(false)
}
