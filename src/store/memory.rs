use std::sync::Arc;

use chrono::{DateTime, Utc};
use mongodb::bson::DateTime as BsonDateTime;
use rocket::tokio::sync::{Mutex, MutexGuard};

use crate::error::{Error, Result};
use crate::model::{
    common::{ElectionStatus, Post, VerificationStatus},
    db::{
        candidate::{Candidate, NewCandidate},
        election::{Election, NewElection},
        registration::{NewVoterRegistration, VoterRegistration},
        vote::{NewVote, Vote},
    },
    mongodb::Id,
};

use super::ElectionStore;

/// A process-local store.
///
/// Every operation holds one lock for its whole duration, so compound
/// operations such as [`ElectionStore::record_vote`] are atomic, and the
/// uniqueness rules enforced by indexes in MongoDB are checked under the
/// same lock as the insert. Cloning yields another handle on the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

/// Records are kept in insertion order.
#[derive(Debug, Default)]
struct Tables {
    elections: Vec<Election>,
    candidates: Vec<Candidate>,
    registrations: Vec<VoterRegistration>,
    votes: Vec<Vote>,
    unavailable: bool,
}

impl MemoryStore {
    /// Simulate losing (or regaining) the connection to the store. While
    /// unavailable, every operation fails with `StoreUnavailable`.
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.tables.lock().await.unavailable = unavailable;
    }

    async fn lock(&self) -> Result<MutexGuard<'_, Tables>> {
        let tables = self.tables.lock().await;
        if tables.unavailable {
            return Err(Error::StoreUnavailable(
                "in-memory store is offline".to_string(),
            ));
        }
        Ok(tables)
    }
}

#[rocket::async_trait]
impl ElectionStore for MemoryStore {
    async fn election(&self, id: Id) -> Result<Option<Election>> {
        let tables = self.lock().await?;
        Ok(tables.elections.iter().find(|e| e.id == id).cloned())
    }

    async fn active_elections(&self) -> Result<Vec<Election>> {
        let tables = self.lock().await?;
        let mut elections: Vec<Election> = tables
            .elections
            .iter()
            .filter(|e| e.is_active)
            .cloned()
            .collect();
        // Newest first.
        elections.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(elections)
    }

    async fn insert_election(&self, election: NewElection) -> Result<Election> {
        let mut tables = self.lock().await?;
        let election = Election {
            id: Id::new(),
            election,
        };
        tables.elections.push(election.clone());
        Ok(election)
    }

    async fn set_election_status(
        &self,
        id: Id,
        status: ElectionStatus,
    ) -> Result<Option<Election>> {
        let mut tables = self.lock().await?;
        Ok(tables
            .elections
            .iter_mut()
            .find(|e| e.id == id)
            .map(|election| {
                election.status = status;
                election.clone()
            }))
    }

    async fn voter_registration(&self, user_id: Id) -> Result<Option<VoterRegistration>> {
        let tables = self.lock().await?;
        Ok(tables
            .registrations
            .iter()
            .find(|r| r.user_id == user_id)
            .cloned())
    }

    async fn insert_voter_registration(
        &self,
        registration: NewVoterRegistration,
    ) -> Result<VoterRegistration> {
        let mut tables = self.lock().await?;
        if tables
            .registrations
            .iter()
            .any(|r| r.user_id == registration.user_id)
        {
            return Err(Error::AlreadyRegistered);
        }
        let registration = VoterRegistration {
            id: Id::new(),
            registration,
        };
        tables.registrations.push(registration.clone());
        Ok(registration)
    }

    async fn set_verification_status(
        &self,
        user_id: Id,
        status: VerificationStatus,
        verified_at: DateTime<Utc>,
    ) -> Result<Option<VoterRegistration>> {
        let mut tables = self.lock().await?;
        Ok(tables
            .registrations
            .iter_mut()
            .find(|r| r.user_id == user_id)
            .map(|registration| {
                registration.verification_status = status;
                registration.verified_at = Some(BsonDateTime::from_chrono(verified_at));
                registration.clone()
            }))
    }

    async fn count_approved_voters(&self) -> Result<u64> {
        let tables = self.lock().await?;
        let approved = tables
            .registrations
            .iter()
            .filter(|r| r.verification_status == VerificationStatus::Approved)
            .count();
        Ok(approved as u64)
    }

    async fn has_voted(&self, voter_id: Id, election_id: Id, post: Post) -> Result<bool> {
        let tables = self.lock().await?;
        Ok(tables.has_voted(voter_id, election_id, post))
    }

    async fn votes_by_voter(&self, voter_id: Id) -> Result<Vec<Vote>> {
        let tables = self.lock().await?;
        Ok(tables
            .votes
            .iter()
            .filter(|v| v.voter_id == voter_id)
            .cloned()
            .collect())
    }

    async fn votes_by_election(&self, election_id: Id) -> Result<Vec<Vote>> {
        let tables = self.lock().await?;
        Ok(tables
            .votes
            .iter()
            .filter(|v| v.election_id == election_id)
            .cloned()
            .collect())
    }

    async fn record_vote(&self, vote: NewVote) -> Result<Vote> {
        let mut tables = self.lock().await?;
        if tables.has_voted(vote.voter_id, vote.election_id, vote.post) {
            return Err(Error::AlreadyVoted);
        }
        let candidate = tables
            .candidates
            .iter_mut()
            .find(|c| {
                c.id == vote.candidate_id
                    && c.election_id == vote.election_id
                    && c.post == vote.post
                    && c.is_approved
            })
            .ok_or_else(|| {
                Error::not_found(format!(
                    "Approved candidate {} for post '{}'",
                    vote.candidate_id, vote.post
                ))
            })?;
        candidate.votes_count += 1;

        let vote = Vote {
            id: Id::new(),
            vote,
        };
        tables.votes.push(vote.clone());
        Ok(vote)
    }

    async fn candidate(&self, id: Id) -> Result<Option<Candidate>> {
        let tables = self.lock().await?;
        Ok(tables.candidates.iter().find(|c| c.id == id).cloned())
    }

    async fn candidates_by_election(&self, election_id: Id) -> Result<Vec<Candidate>> {
        let tables = self.lock().await?;
        Ok(tables
            .candidates
            .iter()
            .filter(|c| c.election_id == election_id)
            .cloned()
            .collect())
    }

    async fn find_candidacy(
        &self,
        election_id: Id,
        user_id: Id,
        post: Post,
    ) -> Result<Option<Candidate>> {
        let tables = self.lock().await?;
        Ok(tables.find_candidacy(election_id, user_id, post).cloned())
    }

    async fn insert_candidate(&self, candidate: NewCandidate) -> Result<Candidate> {
        let mut tables = self.lock().await?;
        if tables
            .find_candidacy(candidate.election_id, candidate.user_id, candidate.post)
            .is_some()
        {
            return Err(Error::AlreadyCandidate);
        }
        let candidate = Candidate {
            id: Id::new(),
            candidate,
        };
        tables.candidates.push(candidate.clone());
        Ok(candidate)
    }

    async fn approve_candidate(&self, id: Id) -> Result<Option<Candidate>> {
        let mut tables = self.lock().await?;
        Ok(tables
            .candidates
            .iter_mut()
            .find(|c| c.id == id)
            .map(|candidate| {
                candidate.is_approved = true;
                candidate.clone()
            }))
    }
}

impl Tables {
    fn has_voted(&self, voter_id: Id, election_id: Id, post: Post) -> bool {
        self.votes
            .iter()
            .any(|v| v.voter_id == voter_id && v.election_id == election_id && v.post == post)
    }

    fn find_candidacy(&self, election_id: Id, user_id: Id, post: Post) -> Option<&Candidate> {
        self.candidates
            .iter()
            .find(|c| c.election_id == election_id && c.user_id == user_id && c.post == post)
    }
}
