use crate::error::{Error, Result};
use crate::model::{
    common::Post,
    db::candidate::{Candidate, CandidateProfile, NewCandidate},
    mongodb::Id,
};
use crate::store::ElectionStore;

/// Register `user_id` as a candidate for `post`. The candidacy starts out
/// unapproved and only appears on ballots once an administrator approves it.
pub async fn register_candidate(
    store: &dyn ElectionStore,
    election_id: Id,
    user_id: Id,
    post: Post,
    profile: CandidateProfile,
) -> Result<Candidate> {
    if profile.manifesto.trim().is_empty() {
        return Err(Error::bad_request("A manifesto is required"));
    }

    store
        .election(election_id)
        .await?
        .ok_or_else(|| Error::not_found(format!("Election {election_id}")))?;

    if store
        .find_candidacy(election_id, user_id, post)
        .await?
        .is_some()
    {
        return Err(Error::AlreadyCandidate);
    }

    let candidate = store
        .insert_candidate(NewCandidate::new(election_id, user_id, post, profile))
        .await?;
    info!(
        "Candidate {} registered for '{post}' in election {election_id}, awaiting approval",
        candidate.id
    );
    Ok(candidate)
}

/// Approve a candidacy so it appears on ballots.
pub async fn approve_candidate(store: &dyn ElectionStore, candidate_id: Id) -> Result<Candidate> {
    let candidate = store
        .approve_candidate(candidate_id)
        .await?
        .ok_or_else(|| Error::not_found(format!("Candidate {candidate_id}")))?;
    info!("Candidate {candidate_id} approved");
    Ok(candidate)
}
