use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::model::{common::ElectionStatus, mongodb::Id};

/// Core election data, as stored in the database.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct ElectionCore {
    /// Election title.
    pub title: String,
    /// Optional longer description.
    pub description: Option<String>,
    /// When polls open.
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub start_date: DateTime<Utc>,
    /// When polls close.
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub end_date: DateTime<Utc>,
    /// Lifecycle state, set by administrators.
    pub status: ElectionStatus,
    /// Hidden elections are neither listed nor open for voting.
    pub is_active: bool,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl ElectionCore {
    /// Create a new, upcoming election.
    pub fn new(
        title: String,
        description: Option<String>,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Self {
        Self {
            title,
            description,
            start_date,
            end_date,
            status: ElectionStatus::Upcoming,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    /// Are polls currently open for this election?
    pub fn accepts_votes(&self) -> bool {
        self.is_active && self.status == ElectionStatus::Active
    }
}

/// An election without an ID.
pub type NewElection = ElectionCore;

/// An election from the database, with its unique ID.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct Election {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub election: ElectionCore,
}

impl Deref for Election {
    type Target = ElectionCore;

    fn deref(&self) -> &Self::Target {
        &self.election
    }
}

impl DerefMut for Election {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.election
    }
}

/// Example data for tests.
#[cfg(test)]
pub mod examples {
    use chrono::Duration;

    use super::*;

    impl ElectionCore {
        pub fn upcoming_example() -> Self {
            let start = Utc::now() + Duration::days(7);
            Self::new(
                "CDS Executive Elections".to_string(),
                Some("Annual election of the CDS executive".to_string()),
                start,
                start + Duration::days(1),
            )
        }

        pub fn active_example() -> Self {
            let start = Utc::now() - Duration::hours(1);
            let mut election = Self::new(
                "CDS Executive Elections".to_string(),
                None,
                start,
                start + Duration::days(1),
            );
            election.status = ElectionStatus::Active;
            election
        }
    }
}
