//! The election core: who may vote, how a vote is cast, how results are
//! derived, and the write paths that feed them.
//!
//! Every operation takes the store as an explicit dependency and performs
//! all of its precondition checks before writing anything.

mod candidacy;
mod cast;
mod election;
mod eligibility;
mod registration;
pub mod tally;

pub use candidacy::{approve_candidate, register_candidate};
pub use cast::cast_vote;
pub use election::{create_election, set_election_status};
pub use eligibility::is_eligible;
pub use registration::{register_voter, review_registration};
pub use tally::{election_results, recount, tally, CountSource, ElectionResults, PostTally};

/// Shared setup for tests that need populated stores.
#[cfg(test)]
pub(crate) mod fixtures {
    use crate::model::{
        common::{Post, VerificationStatus},
        db::{
            candidate::{Candidate, CandidateProfile, NewCandidate},
            election::{Election, ElectionCore},
            registration::VoterRegistrationCore,
        },
        mongodb::Id,
    };
    use crate::store::{ElectionStore, MemoryStore};

    pub async fn active_election(store: &MemoryStore) -> Election {
        store
            .insert_election(ElectionCore::active_example())
            .await
            .unwrap()
    }

    pub async fn pending_candidate(store: &MemoryStore, election_id: Id, post: Post) -> Candidate {
        store
            .insert_candidate(NewCandidate::new(
                election_id,
                Id::new(),
                post,
                CandidateProfile::example(),
            ))
            .await
            .unwrap()
    }

    pub async fn approved_candidate(store: &MemoryStore, election_id: Id, post: Post) -> Candidate {
        let candidate = pending_candidate(store, election_id, post).await;
        store
            .approve_candidate(candidate.id)
            .await
            .unwrap()
            .unwrap()
    }

    /// A user with a registration in the given state. Returns their user ID.
    pub async fn voter(store: &MemoryStore, status: VerificationStatus) -> Id {
        let user_id = Id::new();
        store
            .insert_voter_registration(VoterRegistrationCore::example(user_id, status))
            .await
            .unwrap();
        user_id
    }
}
