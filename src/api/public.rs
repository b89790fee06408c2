use rocket::{serde::json::Json, Route, State};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{
    api::{
        candidate::CandidateDescription,
        election::{ElectionDescription, PostDescription},
    },
    common::{ElectionStatus, Post},
    mongodb::Id,
};
use crate::store::{ElectionStore, Store};
use crate::voting::{
    election_results,
    tally::{CountSource, ElectionResults, PostResults},
};

pub fn routes() -> Vec<Route> {
    routes![
        elections,
        election,
        candidates,
        results,
        post_results,
        posts
    ]
}

#[get("/elections")]
async fn elections(store: &State<Store>) -> Result<Json<Vec<ElectionDescription>>> {
    let elections = store
        .active_elections()
        .await?
        .into_iter()
        .map(ElectionDescription::from)
        .collect();
    Ok(Json(elections))
}

#[get("/elections/<election_id>")]
async fn election(election_id: Id, store: &State<Store>) -> Result<Json<ElectionDescription>> {
    let election = store
        .election(election_id)
        .await?
        .ok_or_else(|| Error::not_found(format!("Election {election_id}")))?;
    Ok(Json(election.into()))
}

/// The approved candidates standing in an election.
#[get("/elections/<election_id>/candidates")]
async fn candidates(
    election_id: Id,
    store: &State<Store>,
) -> Result<Json<Vec<CandidateDescription>>> {
    store
        .election(election_id)
        .await?
        .ok_or_else(|| Error::not_found(format!("Election {election_id}")))?;
    let candidates = store
        .candidates_by_election(election_id)
        .await?
        .into_iter()
        .filter(|c| c.is_approved)
        .map(CandidateDescription::from)
        .collect();
    Ok(Json(candidates))
}

/// Results for every post. `recount` derives them from the vote log instead
/// of the stored counters.
#[get("/elections/<election_id>/results?<recount>")]
async fn results(
    election_id: Id,
    recount: Option<bool>,
    store: &State<Store>,
    config: &State<Config>,
) -> Result<Json<ElectionResults>> {
    ensure_published(store.inner().as_ref(), election_id, config).await?;
    let source = if recount.unwrap_or(false) {
        CountSource::VoteLog
    } else {
        CountSource::Counters
    };
    let results = election_results(store.inner().as_ref(), election_id, source).await?;
    Ok(Json(results))
}

#[get("/elections/<election_id>/results/<post>")]
async fn post_results(
    election_id: Id,
    post: Post,
    store: &State<Store>,
    config: &State<Config>,
) -> Result<Json<PostResults>> {
    ensure_published(store.inner().as_ref(), election_id, config).await?;
    let results = election_results(store.inner().as_ref(), election_id, CountSource::Counters)
        .await?
        .posts
        .into_iter()
        .find(|results| results.tally.post == post)
        .ok_or_else(|| Error::not_found(format!("Post '{post}'")))?;
    Ok(Json(results))
}

#[get("/posts")]
async fn posts() -> Json<Vec<PostDescription>> {
    Json(Post::ALL.into_iter().map(PostDescription::from).collect())
}

/// Results of a running election are hidden unless live results are enabled.
async fn ensure_published(
    store: &dyn ElectionStore,
    election_id: Id,
    config: &Config,
) -> Result<()> {
    let election = store
        .election(election_id)
        .await?
        .ok_or_else(|| Error::not_found(format!("Election {election_id}")))?;
    if config.live_results() || election.status == ElectionStatus::Completed {
        Ok(())
    } else {
        Err(Error::not_found(format!(
            "Results for election {election_id}"
        )))
    }
}
