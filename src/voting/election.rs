use crate::error::{Error, Result};
use crate::model::{
    api::election::ElectionSpec,
    common::ElectionStatus,
    db::election::{Election, NewElection},
    mongodb::Id,
};
use crate::store::ElectionStore;

/// Create a new upcoming election from an administrator's spec.
pub async fn create_election(store: &dyn ElectionStore, spec: ElectionSpec) -> Result<Election> {
    if spec.title.trim().is_empty() {
        return Err(Error::bad_request("An election title is required"));
    }
    if spec.end_date <= spec.start_date {
        return Err(Error::bad_request("An election must end after it starts"));
    }
    let election = store.insert_election(NewElection::from(spec)).await?;
    info!("Created election {} '{}'", election.id, election.title);
    Ok(election)
}

/// Move an election to a new lifecycle state.
pub async fn set_election_status(
    store: &dyn ElectionStore,
    election_id: Id,
    status: ElectionStatus,
) -> Result<Election> {
    let election = store
        .set_election_status(election_id, status)
        .await?
        .ok_or_else(|| Error::not_found(format!("Election {election_id}")))?;
    info!("Election {election_id} is now {status:?}");
    Ok(election)
}
