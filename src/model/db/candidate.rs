use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::model::{common::Post, mongodb::Id};

/// Campaign information a candidate supplies when registering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub manifesto: String,
    #[serde(default)]
    pub campaign_slogan: Option<String>,
    #[serde(default)]
    pub qualifications: Option<String>,
    #[serde(default)]
    pub experience: Option<String>,
}

/// Core candidate data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateCore {
    /// Foreign key election ID.
    pub election_id: Id,
    /// The user standing for election.
    pub user_id: Id,
    /// The post being contested.
    pub post: Post,
    #[serde(flatten)]
    pub profile: CandidateProfile,
    /// Candidates only appear on ballots once approved by an administrator.
    pub is_approved: bool,
    /// Running count of votes received. Only ever incremented alongside
    /// the insertion of the corresponding vote.
    pub votes_count: u64,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl CandidateCore {
    /// A freshly registered, unapproved candidate with no votes.
    pub fn new(election_id: Id, user_id: Id, post: Post, profile: CandidateProfile) -> Self {
        Self {
            election_id,
            user_id,
            post,
            profile,
            is_approved: false,
            votes_count: 0,
            created_at: Utc::now(),
        }
    }
}

/// A candidate without an ID.
pub type NewCandidate = CandidateCore;

/// A candidate from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub candidate: CandidateCore,
}

impl Deref for Candidate {
    type Target = CandidateCore;

    fn deref(&self) -> &Self::Target {
        &self.candidate
    }
}

impl DerefMut for Candidate {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.candidate
    }
}

/// Example data for tests.
#[cfg(test)]
pub mod examples {
    use super::*;

    impl CandidateProfile {
        pub fn example() -> Self {
            Self {
                manifesto: "Transparent accounts and monthly town halls.".to_string(),
                campaign_slogan: Some("Service first".to_string()),
                qualifications: None,
                experience: None,
            }
        }
    }

    impl Candidate {
        /// An approved candidate with the given vote count.
        pub fn example(election_id: Id, post: Post, votes_count: u64) -> Self {
            let mut candidate =
                CandidateCore::new(election_id, Id::new(), post, CandidateProfile::example());
            candidate.is_approved = true;
            candidate.votes_count = votes_count;
            Self {
                id: Id::new(),
                candidate,
            }
        }
    }
}
