use rocket::{serde::json::Json, Route, State};

use crate::error::Result;
use crate::model::{
    api::{
        candidate::CandidateDescription,
        election::{ElectionDescription, ElectionSpec, StatusUpdate},
        registration::{RegistrationDescription, RegistrationReview},
    },
    mongodb::Id,
};
use crate::store::Store;
use crate::voting::{approve_candidate, create_election, review_registration, set_election_status};

pub fn routes() -> Vec<Route> {
    routes![
        create,
        update_status,
        approve,
        review
    ]
}

#[post("/admin/elections", data = "<spec>", format = "json")]
async fn create(
    spec: Json<ElectionSpec>,
    store: &State<Store>,
) -> Result<Json<ElectionDescription>> {
    let election = create_election(store.inner().as_ref(), spec.into_inner()).await?;
    Ok(Json(election.into()))
}

#[put("/admin/elections/<election_id>/status", data = "<update>", format = "json")]
async fn update_status(
    election_id: Id,
    update: Json<StatusUpdate>,
    store: &State<Store>,
) -> Result<Json<ElectionDescription>> {
    let election = set_election_status(store.inner().as_ref(), election_id, update.status).await?;
    Ok(Json(election.into()))
}

#[post("/admin/candidates/<candidate_id>/approve")]
async fn approve(
    candidate_id: Id,
    store: &State<Store>,
) -> Result<Json<CandidateDescription>> {
    let candidate = approve_candidate(store.inner().as_ref(), candidate_id).await?;
    Ok(Json(candidate.into()))
}

#[put("/admin/voters/<user_id>/registration", data = "<review>", format = "json")]
async fn review(
    user_id: Id,
    review: Json<RegistrationReview>,
    store: &State<Store>,
) -> Result<Json<RegistrationDescription>> {
    let registration = review_registration(store.inner().as_ref(), user_id, review.status).await?;
    Ok(Json(registration.into()))
}
