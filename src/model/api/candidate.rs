use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    api::id::ApiId,
    common::Post,
    db::candidate::{Candidate, CandidateProfile},
};

/// A user's request to stand for a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateApplication {
    pub user_id: ApiId,
    pub post: Post,
    #[serde(flatten)]
    pub profile: CandidateProfile,
}

/// An API-friendly candidate description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateDescription {
    pub id: ApiId,
    pub election_id: ApiId,
    pub user_id: ApiId,
    pub post: Post,
    #[serde(flatten)]
    pub profile: CandidateProfile,
    pub is_approved: bool,
    pub votes_count: u64,
    pub created_at: DateTime<Utc>,
}

impl From<Candidate> for CandidateDescription {
    fn from(candidate: Candidate) -> Self {
        Self {
            id: candidate.id.into(),
            election_id: candidate.election_id.into(),
            user_id: candidate.user_id.into(),
            post: candidate.post,
            is_approved: candidate.is_approved,
            votes_count: candidate.votes_count,
            created_at: candidate.created_at,
            profile: candidate.candidate.profile,
        }
    }
}
