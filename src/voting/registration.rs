use chrono::Utc;

use crate::error::{Error, Result};
use crate::model::{
    common::{IdentityDocumentType, VerificationStatus},
    db::registration::{NewVoterRegistration, VoterRegistration},
    mongodb::Id,
};
use crate::store::ElectionStore;

/// Submit a voter registration for verification.
pub async fn register_voter(
    store: &dyn ElectionStore,
    user_id: Id,
    identity_document_type: IdentityDocumentType,
    address: String,
    identity_document_url: Option<String>,
) -> Result<VoterRegistration> {
    if address.trim().is_empty() {
        return Err(Error::bad_request("An address is required"));
    }
    let registration = store
        .insert_voter_registration(NewVoterRegistration::new(
            user_id,
            identity_document_type,
            address,
            identity_document_url,
        ))
        .await?;
    info!("Voter registration submitted for user {user_id}");
    Ok(registration)
}

/// Record a verifier's decision on a user's registration.
pub async fn review_registration(
    store: &dyn ElectionStore,
    user_id: Id,
    status: VerificationStatus,
) -> Result<VoterRegistration> {
    if status == VerificationStatus::Pending {
        return Err(Error::bad_request(
            "A review must approve or reject the registration",
        ));
    }
    let registration = store
        .set_verification_status(user_id, status, Utc::now())
        .await?
        .ok_or_else(|| Error::not_found(format!("Voter registration for user {user_id}")))?;
    info!("Voter registration for user {user_id} marked {status:?}");
    Ok(registration)
}

#[cfg(test)]
mod tests {
    use crate::store::MemoryStore;
    use crate::voting::is_eligible;

    use super::*;

    #[rocket::async_test]
    async fn registration_becomes_eligible_once_approved() {
        let store = MemoryStore::default();
        let user = Id::new();

        let registration = register_voter(
            &store,
            user,
            IdentityDocumentType::Passport,
            "4 Market Street".to_string(),
            None,
        )
        .await
        .unwrap();
        assert_eq!(registration.verification_status, VerificationStatus::Pending);
        assert!(registration.verified_at.is_none());
        assert!(!is_eligible(Some(&registration.registration)));

        let reviewed = review_registration(&store, user, VerificationStatus::Approved)
            .await
            .unwrap();
        assert!(reviewed.verified_at.is_some());
        assert!(is_eligible(Some(&reviewed.registration)));
        assert_eq!(store.count_approved_voters().await.unwrap(), 1);
    }

    #[rocket::async_test]
    async fn second_registration_is_rejected() {
        let store = MemoryStore::default();
        let user = Id::new();
        async fn submit(store: &MemoryStore, user: Id) -> Result<VoterRegistration> {
            register_voter(
                store,
                user,
                IdentityDocumentType::NationalId,
                "4 Market Street".to_string(),
                None,
            )
            .await
        }
        submit(&store, user).await.unwrap();
        assert!(matches!(
            submit(&store, user).await,
            Err(Error::AlreadyRegistered)
        ));
    }

    #[rocket::async_test]
    async fn invalid_reviews_are_rejected() {
        let store = MemoryStore::default();
        let missing = review_registration(&store, Id::new(), VerificationStatus::Rejected).await;
        assert!(matches!(missing, Err(Error::NotFound(_))));

        let pending = review_registration(&store, Id::new(), VerificationStatus::Pending).await;
        assert!(matches!(pending, Err(Error::BadRequest(_))));

        let blank = register_voter(
            &store,
            Id::new(),
            IdentityDocumentType::Passport,
            " ".to_string(),
            None,
        )
        .await;
        assert!(matches!(blank, Err(Error::BadRequest(_))));
    }
}
