use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    api::id::ApiId,
    common::Post,
    db::{candidate::Candidate, vote::Vote},
    mongodb::Id,
};
use crate::store::ElectionStore;

/// One candidate's standing in the race for a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TallyEntry {
    pub candidate_id: ApiId,
    pub user_id: ApiId,
    pub votes: u64,
    /// Share of the post's votes, from 0 to 100.
    pub percentage: f64,
    /// Set on the first entry only, and only once someone has voted.
    pub leading: bool,
}

/// Ranked results for a single post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostTally {
    pub post: Post,
    pub total_votes: u64,
    pub entries: Vec<TallyEntry>,
}

/// Rank the candidates contesting `post` by their vote counts.
///
/// Candidates for other posts are ignored. Entries are sorted by votes,
/// highest first; equal counts are ordered by candidate ID, i.e. by
/// registration order. This is a pure projection and never stored.
pub fn tally<'a>(post: Post, candidates: impl IntoIterator<Item = &'a Candidate>) -> PostTally {
    let mut contesting = candidates
        .into_iter()
        .filter(|c| c.post == post)
        .collect::<Vec<_>>();
    contesting.sort_by(|a, b| b.votes_count.cmp(&a.votes_count).then(a.id.cmp(&b.id)));

    let total_votes: u64 = contesting.iter().map(|c| c.votes_count).sum();
    let entries = contesting
        .into_iter()
        .enumerate()
        .map(|(rank, candidate)| TallyEntry {
            candidate_id: candidate.id.into(),
            user_id: candidate.user_id.into(),
            votes: candidate.votes_count,
            percentage: percentage(candidate.votes_count, total_votes),
            leading: rank == 0 && total_votes > 0,
        })
        .collect();

    PostTally {
        post,
        total_votes,
        entries,
    }
}

/// Overwrite each candidate's counter with the number of votes for them in
/// the vote log, so that results can be derived from the source records
/// rather than the denormalised counters.
pub fn recount(candidates: &mut [Candidate], votes: &[Vote]) {
    let mut counts: HashMap<Id, u64> = HashMap::new();
    for vote in votes {
        *counts.entry(vote.candidate_id).or_default() += 1;
    }
    for candidate in candidates.iter_mut() {
        candidate.votes_count = counts.get(&candidate.id).copied().unwrap_or(0);
    }
}

/// `part` as a percentage of `total`, or 0 when there is nothing to divide.
pub fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// Results for every post of an election.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectionResults {
    pub election_id: ApiId,
    /// Voters with an approved registration.
    pub registered_voters: u64,
    pub posts: Vec<PostResults>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostResults {
    #[serde(flatten)]
    pub tally: PostTally,
    pub label: String,
    /// Votes cast for this post as a percentage of registered voters.
    pub turnout_percentage: f64,
}

/// Where a candidate's vote count is taken from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CountSource {
    /// The counters maintained alongside each vote.
    Counters,
    /// A fresh count of the vote log.
    VoteLog,
}

/// Compute results for all posts of an election, over approved candidates.
pub async fn election_results(
    store: &dyn ElectionStore,
    election_id: Id,
    source: CountSource,
) -> Result<ElectionResults> {
    store
        .election(election_id)
        .await?
        .ok_or_else(|| Error::not_found(format!("Election {election_id}")))?;

    let mut candidates = store
        .candidates_by_election(election_id)
        .await?
        .into_iter()
        .filter(|c| c.is_approved)
        .collect::<Vec<_>>();
    if source == CountSource::VoteLog {
        let votes = store.votes_by_election(election_id).await?;
        recount(&mut candidates, &votes);
    }
    let registered_voters = store.count_approved_voters().await?;

    let posts = Post::ALL
        .into_iter()
        .map(|post| {
            let post_tally = tally(post, &candidates);
            PostResults {
                label: post.label().to_string(),
                turnout_percentage: percentage(post_tally.total_votes, registered_voters),
                tally: post_tally,
            }
        })
        .collect();

    Ok(ElectionResults {
        election_id: election_id.into(),
        registered_voters,
        posts,
    })
}

#[cfg(test)]
mod tests {
    use crate::model::common::VerificationStatus;
    use crate::store::MemoryStore;
    use crate::voting::{cast_vote, fixtures};

    use super::*;

    fn candidates(election_id: Id, post: Post, counts: &[u64]) -> Vec<Candidate> {
        counts
            .iter()
            .map(|&count| Candidate::example(election_id, post, count))
            .collect()
    }

    #[test]
    fn ranks_by_votes_with_percentages() {
        let election = Id::new();
        let clo = candidates(election, Post::Clo, &[1, 3]);
        let (y, x) = (&clo[0], &clo[1]);

        let result = tally(Post::Clo, &clo);

        assert_eq!(result.total_votes, 4);
        assert_eq!(result.entries.len(), 2);
        assert_eq!(*result.entries[0].candidate_id, x.id);
        assert_eq!(result.entries[0].votes, 3);
        assert_eq!(result.entries[0].percentage, 75.0);
        assert!(result.entries[0].leading);
        assert_eq!(*result.entries[1].candidate_id, y.id);
        assert_eq!(result.entries[1].percentage, 25.0);
        assert!(!result.entries[1].leading);
    }

    #[test]
    fn post_without_candidates_is_empty() {
        let clo = candidates(Id::new(), Post::Clo, &[3, 1]);
        let result = tally(Post::MarshallMale, &clo);
        assert_eq!(result.total_votes, 0);
        assert!(result.entries.is_empty());
    }

    #[test]
    fn no_votes_means_no_leader_and_zero_percentages() {
        let provost = candidates(Id::new(), Post::Provost, &[0, 0, 0]);
        let result = tally(Post::Provost, &provost);
        assert_eq!(result.total_votes, 0);
        assert!(result.entries.iter().all(|e| e.percentage == 0.0));
        assert!(result.entries.iter().all(|e| !e.leading));
    }

    #[test]
    fn percentages_sum_to_one_hundred() {
        let provost = candidates(Id::new(), Post::Provost, &[1, 1, 1, 4, 7]);
        let result = tally(Post::Provost, &provost);
        let sum: f64 = result.entries.iter().map(|e| e.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-9, "sum was {sum}");
    }

    #[test]
    fn ties_follow_registration_order_regardless_of_input_order() {
        let mut provost = candidates(Id::new(), Post::Provost, &[2, 2, 5]);
        let expected = vec![provost[2].id, provost[0].id, provost[1].id];

        provost.reverse();
        let result = tally(Post::Provost, &provost);
        let order = result
            .entries
            .iter()
            .map(|e| *e.candidate_id)
            .collect::<Vec<_>>();
        assert_eq!(order, expected);
    }

    #[test]
    fn tally_is_repeatable() {
        let provost = candidates(Id::new(), Post::Provost, &[4, 4, 1, 0]);
        assert_eq!(tally(Post::Provost, &provost), tally(Post::Provost, &provost));
    }

    #[test]
    fn recount_uses_the_vote_log() {
        let election = Id::new();
        let mut clo = candidates(election, Post::Clo, &[10, 10]);
        let votes = (0..3)
            .map(|_| Vote {
                id: Id::new(),
                vote: crate::model::db::vote::NewVote::new(
                    election,
                    Id::new(),
                    clo[1].id,
                    Post::Clo,
                ),
            })
            .collect::<Vec<_>>();

        recount(&mut clo, &votes);

        assert_eq!(clo[0].votes_count, 0);
        assert_eq!(clo[1].votes_count, 3);
    }

    #[rocket::async_test]
    async fn counters_agree_with_vote_log_after_casting() {
        let store = MemoryStore::default();
        let election = fixtures::active_election(&store).await;
        let x = fixtures::approved_candidate(&store, election.id, Post::Clo).await;
        let y = fixtures::approved_candidate(&store, election.id, Post::Clo).await;
        for choice in [x.id, x.id, x.id, y.id] {
            let voter = fixtures::voter(&store, VerificationStatus::Approved).await;
            cast_vote(&store, election.id, voter, choice, Post::Clo)
                .await
                .unwrap();
        }
        // A registered voter who abstains still counts towards turnout.
        fixtures::voter(&store, VerificationStatus::Approved).await;

        let from_counters = election_results(&store, election.id, CountSource::Counters)
            .await
            .unwrap();
        let from_log = election_results(&store, election.id, CountSource::VoteLog)
            .await
            .unwrap();
        assert_eq!(from_counters, from_log);

        assert_eq!(from_counters.registered_voters, 5);
        assert_eq!(from_counters.posts.len(), Post::ALL.len());
        let clo = &from_counters.posts[0];
        assert_eq!(clo.tally.post, Post::Clo);
        assert_eq!(clo.tally.total_votes, 4);
        assert_eq!(clo.turnout_percentage, 80.0);
        assert_eq!(*clo.tally.entries[0].candidate_id, x.id);
        assert_eq!(clo.tally.entries[0].percentage, 75.0);
    }

    #[rocket::async_test]
    async fn unapproved_candidates_are_left_out() {
        let store = MemoryStore::default();
        let election = fixtures::active_election(&store).await;
        fixtures::approved_candidate(&store, election.id, Post::Provost).await;
        fixtures::pending_candidate(&store, election.id, Post::Provost).await;

        let results = election_results(&store, election.id, CountSource::Counters)
            .await
            .unwrap();
        let provost = results
            .posts
            .iter()
            .find(|p| p.tally.post == Post::Provost)
            .unwrap();
        assert_eq!(provost.tally.entries.len(), 1);
        assert_eq!(provost.turnout_percentage, 0.0);
    }
}
