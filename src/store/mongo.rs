use std::time::Duration;

use chrono::{DateTime, Utc};
use mongodb::{
    bson::{doc, DateTime as BsonDateTime, Document},
    error::Error as DbError,
    options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument},
    Client, Database,
};
use rocket::{futures::TryStreamExt, tokio::time::sleep};
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::model::{
    common::{ElectionStatus, Post, VerificationStatus},
    db::{
        candidate::{Candidate, NewCandidate},
        election::{Election, NewElection},
        registration::{NewVoterRegistration, VoterRegistration},
        vote::{NewVote, Vote},
    },
    mongodb::{
        is_duplicate_key_error, is_transient_transaction_error, Coll, Id, MongoCollection,
    },
};

use super::ElectionStore;

/// How many times a conflicting vote transaction is attempted.
const VOTE_TRANSACTION_ATTEMPTS: u32 = 5;

/// MongoDB-backed store.
///
/// Relies on the unique indexes created by
/// [`ensure_indexes_exist`](crate::model::mongodb::ensure_indexes_exist),
/// and on multi-document transactions (so the server must be a replica set).
#[derive(Debug, Clone)]
pub struct MongoStore {
    client: Client,
    db: Database,
}

impl MongoStore {
    pub fn new(client: Client, db: Database) -> Self {
        Self { client, db }
    }

    fn coll<T: MongoCollection>(&self) -> Coll<T> {
        Coll::from_db(&self.db)
    }

    /// Run a find, returning results in creation order.
    async fn find_all<T>(&self, filter: Document) -> Result<Vec<T>>
    where
        T: MongoCollection + DeserializeOwned + Unpin + Send + Sync,
    {
        self.find_sorted(filter, doc! {"_id": 1}).await
    }

    async fn find_sorted<T>(&self, filter: Document, sort: Document) -> Result<Vec<T>>
    where
        T: MongoCollection + DeserializeOwned + Unpin + Send + Sync,
    {
        let options = FindOptions::builder().sort(sort).build();
        let found = self
            .coll::<T>()
            .find(filter, options)
            .await?
            .try_collect()
            .await?;
        Ok(found)
    }

    /// Apply an update to one document and return the updated version.
    async fn update_and_fetch<T>(&self, filter: Document, update: Document) -> Result<Option<T>>
    where
        T: MongoCollection + DeserializeOwned + Unpin + Send + Sync,
    {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        let updated = self
            .coll::<T>()
            .find_one_and_update(filter, update, options)
            .await?;
        Ok(updated)
    }

    /// Insert the vote and credit the candidate in one transaction.
    ///
    /// Returns `false`, with nothing written, if no approved candidate
    /// matches the vote.
    async fn vote_transaction(&self, vote: &Vote) -> std::result::Result<bool, DbError> {
        let mut session = self.client.start_session(None).await?;
        session.start_transaction(None).await?;

        // Dropping the session on an early return aborts the transaction.
        self.coll::<Vote>()
            .insert_one_with_session(vote, None, &mut session)
            .await?;

        let candidate_filter = doc! {
            "_id": vote.candidate_id,
            "election_id": vote.election_id,
            "post": vote.post,
            "is_approved": true,
        };
        let increment = doc! {
            "$inc": {
                "votes_count": 1,
            }
        };
        let result = self
            .coll::<Candidate>()
            .update_one_with_session(candidate_filter, increment, None, &mut session)
            .await?;
        if result.matched_count != 1 {
            session.abort_transaction().await?;
            return Ok(false);
        }

        session.commit_transaction().await?;
        Ok(true)
    }
}

#[rocket::async_trait]
impl ElectionStore for MongoStore {
    async fn election(&self, id: Id) -> Result<Option<Election>> {
        Ok(self.coll::<Election>().find_one(id.as_doc(), None).await?)
    }

    async fn active_elections(&self) -> Result<Vec<Election>> {
        self.find_sorted(doc! {"is_active": true}, doc! {"created_at": -1, "_id": -1})
            .await
    }

    async fn insert_election(&self, election: NewElection) -> Result<Election> {
        let election = Election {
            id: Id::new(),
            election,
        };
        self.coll::<Election>().insert_one(&election, None).await?;
        Ok(election)
    }

    async fn set_election_status(
        &self,
        id: Id,
        status: ElectionStatus,
    ) -> Result<Option<Election>> {
        let update = doc! {
            "$set": {
                "status": status,
            }
        };
        self.update_and_fetch(id.as_doc(), update).await
    }

    async fn voter_registration(&self, user_id: Id) -> Result<Option<VoterRegistration>> {
        let filter = doc! {
            "user_id": user_id,
        };
        Ok(self
            .coll::<VoterRegistration>()
            .find_one(filter, None)
            .await?)
    }

    async fn insert_voter_registration(
        &self,
        registration: NewVoterRegistration,
    ) -> Result<VoterRegistration> {
        let registration = VoterRegistration {
            id: Id::new(),
            registration,
        };
        match self
            .coll::<VoterRegistration>()
            .insert_one(&registration, None)
            .await
        {
            Ok(_) => Ok(registration),
            Err(err) if is_duplicate_key_error(&err) => Err(Error::AlreadyRegistered),
            Err(err) => Err(err.into()),
        }
    }

    async fn set_verification_status(
        &self,
        user_id: Id,
        status: VerificationStatus,
        verified_at: DateTime<Utc>,
    ) -> Result<Option<VoterRegistration>> {
        let filter = doc! {
            "user_id": user_id,
        };
        let update = doc! {
            "$set": {
                "verification_status": status,
                "verified_at": BsonDateTime::from_chrono(verified_at),
            }
        };
        self.update_and_fetch(filter, update).await
    }

    async fn count_approved_voters(&self) -> Result<u64> {
        let filter = doc! {
            "verification_status": VerificationStatus::Approved,
        };
        Ok(self
            .coll::<VoterRegistration>()
            .count_documents(filter, None)
            .await?)
    }

    async fn has_voted(&self, voter_id: Id, election_id: Id, post: Post) -> Result<bool> {
        let filter = doc! {
            "voter_id": voter_id,
            "election_id": election_id,
            "post": post,
        };
        let existing = self.coll::<Vote>().find_one(filter, None).await?;
        Ok(existing.is_some())
    }

    async fn votes_by_voter(&self, voter_id: Id) -> Result<Vec<Vote>> {
        self.find_all(doc! {"voter_id": voter_id}).await
    }

    async fn votes_by_election(&self, election_id: Id) -> Result<Vec<Vote>> {
        self.find_all(doc! {"election_id": election_id}).await
    }

    async fn record_vote(&self, vote: NewVote) -> Result<Vote> {
        let vote = Vote {
            id: Id::new(),
            vote,
        };

        // A racing insert of the same key aborts with a write conflict rather
        // than a duplicate key. Retrying lets it see the committed vote.
        let mut attempt = 1;
        loop {
            match self.vote_transaction(&vote).await {
                Ok(true) => return Ok(vote),
                Ok(false) => {
                    return Err(Error::not_found(format!(
                        "Approved candidate {} for post '{}'",
                        vote.candidate_id, vote.post
                    )))
                }
                Err(err) if is_duplicate_key_error(&err) => return Err(Error::AlreadyVoted),
                Err(err)
                    if is_transient_transaction_error(&err)
                        && attempt < VOTE_TRANSACTION_ATTEMPTS =>
                {
                    debug!("Vote transaction attempt {attempt} conflicted, retrying: {err}");
                    sleep(Duration::from_millis(20 * u64::from(attempt))).await;
                    attempt += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    async fn candidate(&self, id: Id) -> Result<Option<Candidate>> {
        Ok(self.coll::<Candidate>().find_one(id.as_doc(), None).await?)
    }

    async fn candidates_by_election(&self, election_id: Id) -> Result<Vec<Candidate>> {
        self.find_all(doc! {"election_id": election_id}).await
    }

    async fn find_candidacy(
        &self,
        election_id: Id,
        user_id: Id,
        post: Post,
    ) -> Result<Option<Candidate>> {
        let filter = doc! {
            "election_id": election_id,
            "user_id": user_id,
            "post": post,
        };
        Ok(self.coll::<Candidate>().find_one(filter, None).await?)
    }

    async fn insert_candidate(&self, candidate: NewCandidate) -> Result<Candidate> {
        let candidate = Candidate {
            id: Id::new(),
            candidate,
        };
        match self.coll::<Candidate>().insert_one(&candidate, None).await {
            Ok(_) => Ok(candidate),
            Err(err) if is_duplicate_key_error(&err) => Err(Error::AlreadyCandidate),
            Err(err) => Err(err.into()),
        }
    }

    async fn approve_candidate(&self, id: Id) -> Result<Option<Candidate>> {
        let update = doc! {
            "$set": {
                "is_approved": true,
            }
        };
        self.update_and_fetch(id.as_doc(), update).await
    }
}
