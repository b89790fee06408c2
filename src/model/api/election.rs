use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    api::id::ApiId,
    common::{ElectionStatus, Post},
    db::election::{Election, NewElection},
};

/// An election as specified by an administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionSpec {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl From<ElectionSpec> for NewElection {
    fn from(spec: ElectionSpec) -> Self {
        NewElection::new(spec.title, spec.description, spec.start_date, spec.end_date)
    }
}

/// Request body for moving an election to a new lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: ElectionStatus,
}

/// An API-friendly election description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionDescription {
    pub id: ApiId,
    pub title: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: ElectionStatus,
    pub is_active: bool,
    /// Whether votes can be cast right now.
    pub accepts_votes: bool,
}

impl From<Election> for ElectionDescription {
    fn from(election: Election) -> Self {
        let accepts_votes = election.accepts_votes();
        Self {
            id: election.id.into(),
            title: election.election.title,
            description: election.election.description,
            start_date: election.election.start_date,
            end_date: election.election.end_date,
            status: election.election.status,
            is_active: election.election.is_active,
            accepts_votes,
        }
    }
}

/// A post together with its display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDescription {
    pub value: Post,
    pub label: String,
}

impl From<Post> for PostDescription {
    fn from(post: Post) -> Self {
        Self {
            value: post,
            label: post.label().to_string(),
        }
    }
}
