//! The persistence boundary.
//!
//! Everything the election core reads or writes goes through
//! [`ElectionStore`]. A single store is constructed per process and placed
//! in Rocket's managed state as a [`Store`].

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::Result;
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

mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// The shared store handle.
pub type Store = Arc<dyn ElectionStore>;

#[rocket::async_trait]
pub trait ElectionStore: Send + Sync {
    // Elections

    async fn election(&self, id: Id) -> Result<Option<Election>>;

    /// All elections with `is_active` set, oldest first.
    async fn active_elections(&self) -> Result<Vec<Election>>;

    async fn insert_election(&self, election: NewElection) -> Result<Election>;

    /// Returns `None` if there is no such election.
    async fn set_election_status(
        &self,
        id: Id,
        status: ElectionStatus,
    ) -> Result<Option<Election>>;

    // Voter registrations

    async fn voter_registration(&self, user_id: Id) -> Result<Option<VoterRegistration>>;

    /// Fails with `AlreadyRegistered` if the user already has a registration.
    async fn insert_voter_registration(
        &self,
        registration: NewVoterRegistration,
    ) -> Result<VoterRegistration>;

    /// Returns `None` if the user has no registration.
    async fn set_verification_status(
        &self,
        user_id: Id,
        status: VerificationStatus,
        verified_at: DateTime<Utc>,
    ) -> Result<Option<VoterRegistration>>;

    async fn count_approved_voters(&self) -> Result<u64>;

    // Votes

    async fn has_voted(&self, voter_id: Id, election_id: Id, post: Post) -> Result<bool>;

    async fn votes_by_voter(&self, voter_id: Id) -> Result<Vec<Vote>>;

    async fn votes_by_election(&self, election_id: Id) -> Result<Vec<Vote>>;

    /// Atomically insert the vote and increment its candidate's counter.
    ///
    /// Either both writes happen or neither does. Fails with:
    /// - `AlreadyVoted` if a vote for the same voter, election and post exists;
    /// - `NotFound` if the candidate is not an approved candidate for that
    ///   election and post.
    async fn record_vote(&self, vote: NewVote) -> Result<Vote>;

    // Candidates

    async fn candidate(&self, id: Id) -> Result<Option<Candidate>>;

    /// All candidates for the election, approved or not, oldest first.
    async fn candidates_by_election(&self, election_id: Id) -> Result<Vec<Candidate>>;

    async fn find_candidacy(
        &self,
        election_id: Id,
        user_id: Id,
        post: Post,
    ) -> Result<Option<Candidate>>;

    /// Fails with `AlreadyCandidate` if the user already stands for the post.
    async fn insert_candidate(&self, candidate: NewCandidate) -> Result<Candidate>;

    /// Returns `None` if there is no such candidate.
    async fn approve_candidate(&self, id: Id) -> Result<Option<Candidate>>;
}
