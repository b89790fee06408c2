use crate::error::{Error, Result};
use crate::model::{
    common::Post,
    db::vote::{NewVote, Vote},
    mongodb::Id,
};
use crate::store::ElectionStore;

use super::eligibility::is_eligible;

/// Cast `voter_id`'s vote for `candidate_id` in the race for `post`.
///
/// Checks, in order, that the election exists and is open, that the voter
/// is eligible, and that they have not already voted for this post. The
/// vote row and the candidate's counter are then written as one unit by
/// the store, which also rejects duplicates that slip past the pre-check
/// (e.g. a double submission).
pub async fn cast_vote(
    store: &dyn ElectionStore,
    election_id: Id,
    voter_id: Id,
    candidate_id: Id,
    post: Post,
) -> Result<Vote> {
    let election = store
        .election(election_id)
        .await?
        .ok_or_else(|| Error::not_found(format!("Election {election_id}")))?;
    if !election.accepts_votes() {
        return Err(Error::ElectionNotOpen);
    }

    let registration = store.voter_registration(voter_id).await?;
    if !is_eligible(registration.as_deref()) {
        return Err(Error::NotEligible);
    }

    if store.has_voted(voter_id, election_id, post).await? {
        return Err(Error::AlreadyVoted);
    }

    let vote = store
        .record_vote(NewVote::new(election_id, voter_id, candidate_id, post))
        .await?;
    info!("Vote {} cast in election {election_id} for post '{post}'", vote.id);
    Ok(vote)
}
