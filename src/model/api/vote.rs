use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{api::id::ApiId, common::Post, db::vote::Vote};

/// A ballot for a single post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRequest {
    pub voter_id: ApiId,
    pub candidate_id: ApiId,
    pub post: Post,
}

/// An API-friendly record of a cast vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteReceipt {
    pub id: ApiId,
    pub election_id: ApiId,
    pub voter_id: ApiId,
    pub candidate_id: ApiId,
    pub post: Post,
    pub created_at: DateTime<Utc>,
}

impl From<Vote> for VoteReceipt {
    fn from(vote: Vote) -> Self {
        Self {
            id: vote.id.into(),
            election_id: vote.election_id.into(),
            voter_id: vote.voter_id.into(),
            candidate_id: vote.candidate_id.into(),
            post: vote.post,
            created_at: vote.created_at,
        }
    }
}
