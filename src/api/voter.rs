use rocket::{serde::json::Json, Route, State};

use crate::error::{Error, Result};
use crate::model::{
    api::{
        registration::{RegistrationDescription, RegistrationRequest},
        vote::{VoteReceipt, VoteRequest},
    },
    mongodb::Id,
};
use crate::store::Store;
use crate::voting::{cast_vote, register_voter};

pub fn routes() -> Vec<Route> {
    routes![submit_registration, registration, voter_votes, vote]
}

#[post("/voters/registration", data = "<request>", format = "json")]
async fn submit_registration(
    request: Json<RegistrationRequest>,
    store: &State<Store>,
) -> Result<Json<RegistrationDescription>> {
    let request = request.into_inner();
    let registration = register_voter(
        store.inner().as_ref(),
        *request.user_id,
        request.identity_document_type,
        request.address,
        request.identity_document_url,
    )
    .await?;
    Ok(Json(registration.into()))
}

/// A user's registration, including whether it currently makes them eligible.
#[get("/voters/<user_id>/registration")]
async fn registration(
    user_id: Id,
    store: &State<Store>,
) -> Result<Json<RegistrationDescription>> {
    let registration = store
        .voter_registration(user_id)
        .await?
        .ok_or_else(|| Error::not_found(format!("Voter registration for user {user_id}")))?;
    Ok(Json(registration.into()))
}

#[get("/voters/<user_id>/votes")]
async fn voter_votes(user_id: Id, store: &State<Store>) -> Result<Json<Vec<VoteReceipt>>> {
    let votes = store
        .votes_by_voter(user_id)
        .await?
        .into_iter()
        .map(VoteReceipt::from)
        .collect();
    Ok(Json(votes))
}

#[post("/elections/<election_id>/votes", data = "<request>", format = "json")]
async fn vote(
    election_id: Id,
    request: Json<VoteRequest>,
    store: &State<Store>,
) -> Result<Json<VoteReceipt>> {
    let vote = cast_vote(
        store.inner().as_ref(),
        election_id,
        *request.voter_id,
        *request.candidate_id,
        request.post,
    )
    .await?;
    Ok(Json(vote.into()))
}

#[cfg(test)]
mod tests {
    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::Client,
        serde::json::serde_json::json,
    };

    use crate::error::ErrorBody;
    use crate::model::common::{ElectionStatus, Post, VerificationStatus};
    use crate::store::{ElectionStore, MemoryStore};
    use crate::voting::fixtures;

    use super::*;

    #[backend_test]
    async fn registration_round_trip(client: Client, store: MemoryStore) {
        let user = Id::new();
        let body = json!({
            "user_id": user.to_string(),
            "identity_document_type": "passport",
            "address": "7 Creek Road, Yenagoa",
        });

        let response = client
            .post(uri!(submit_registration))
            .header(ContentType::JSON)
            .body(body.to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let submitted = response
            .into_json::<RegistrationDescription>()
            .await
            .unwrap();
        assert_eq!(*submitted.user_id, user);
        assert_eq!(submitted.verification_status, VerificationStatus::Pending);
        assert!(!submitted.eligible);

        let response = client
            .post(uri!(submit_registration))
            .header(ContentType::JSON)
            .body(body.to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Conflict, response.status());

        let response = client.get(uri!(registration(user))).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        assert_eq!(
            submitted,
            response
                .into_json::<RegistrationDescription>()
                .await
                .unwrap()
        );
        assert!(store.voter_registration(user).await.unwrap().is_some());

        let response = client.get(uri!(registration(Id::new()))).dispatch().await;
        assert_eq!(Status::NotFound, response.status());
    }

    #[backend_test]
    async fn vote_flow(client: Client, store: MemoryStore) {
        let election = fixtures::active_election(&store).await;
        let candidate = fixtures::approved_candidate(&store, election.id, Post::Clo).await;
        let voter = fixtures::voter(&store, VerificationStatus::Approved).await;
        let request = VoteRequest {
            voter_id: voter.into(),
            candidate_id: candidate.id.into(),
            post: Post::Clo,
        };

        let response = client
            .post(uri!(vote(election.id)))
            .header(ContentType::JSON)
            .body(json!(request).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let receipt = response.into_json::<VoteReceipt>().await.unwrap();
        assert_eq!(*receipt.candidate_id, candidate.id);

        // Second attempt for the same post.
        let response = client
            .post(uri!(vote(election.id)))
            .header(ContentType::JSON)
            .body(json!(request).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Conflict, response.status());
        let body = response.into_json::<ErrorBody>().await.unwrap();
        assert_eq!(body.error, "You have already voted for this position");

        let response = client.get(uri!(voter_votes(voter))).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        assert_eq!(
            vec![receipt],
            response.into_json::<Vec<VoteReceipt>>().await.unwrap()
        );
        let candidate = store.candidate(candidate.id).await.unwrap().unwrap();
        assert_eq!(candidate.votes_count, 1);
    }

    #[backend_test]
    async fn vote_rejections_map_to_statuses(client: Client, store: MemoryStore) {
        let election = fixtures::active_election(&store).await;
        let candidate = fixtures::approved_candidate(&store, election.id, Post::Provost).await;
        let pending = fixtures::voter(&store, VerificationStatus::Pending).await;
        let approved = fixtures::voter(&store, VerificationStatus::Approved).await;

        let candidate_id = candidate.id;
        let client = &client;
        let cast = move |voter: Id, election_id: Id| {
            let body = json!(VoteRequest {
                voter_id: voter.into(),
                candidate_id: candidate_id.into(),
                post: Post::Provost,
            })
            .to_string();
            client
                .post(uri!(vote(election_id)))
                .header(ContentType::JSON)
                .body(body)
                .dispatch()
        };

        assert_eq!(Status::Forbidden, cast(pending, election.id).await.status());
        assert_eq!(Status::NotFound, cast(approved, Id::new()).await.status());

        store
            .set_election_status(election.id, ElectionStatus::Completed)
            .await
            .unwrap();
        assert_eq!(
            Status::UnprocessableEntity,
            cast(approved, election.id).await.status()
        );
        assert!(store.votes_by_voter(approved).await.unwrap().is_empty());
    }
}
