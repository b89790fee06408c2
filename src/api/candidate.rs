use rocket::{serde::json::Json, Route, State};

use crate::error::Result;
use crate::model::{
    api::candidate::{CandidateApplication, CandidateDescription},
    mongodb::Id,
};
use crate::store::Store;
use crate::voting::register_candidate;

pub fn routes() -> Vec<Route> {
    routes![apply]
}

/// Stand for a post. The candidacy is hidden until an administrator approves it.
#[post("/elections/<election_id>/candidates", data = "<application>", format = "json")]
async fn apply(
    election_id: Id,
    application: Json<CandidateApplication>,
    store: &State<Store>,
) -> Result<Json<CandidateDescription>> {
    let application = application.into_inner();
    let candidate = register_candidate(
        store.inner().as_ref(),
        election_id,
        *application.user_id,
        application.post,
        application.profile,
    )
    .await?;
    Ok(Json(candidate.into()))
}

#[cfg(test)]
mod tests {
    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::Client,
        serde::json::serde_json::json,
    };

    use crate::model::{common::Post, db::candidate::CandidateProfile};
    use crate::store::{ElectionStore, MemoryStore};
    use crate::voting::fixtures;

    use super::*;

    #[backend_test]
    async fn apply_then_conflict(client: Client, store: MemoryStore) {
        let election = fixtures::active_election(&store).await;
        let application = CandidateApplication {
            user_id: Id::new().into(),
            post: Post::FinancialSecretary,
            profile: CandidateProfile::example(),
        };

        let response = client
            .post(uri!(apply(election.id)))
            .header(ContentType::JSON)
            .body(json!(application).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let candidate = response
            .into_json::<CandidateDescription>()
            .await
            .unwrap();
        assert!(!candidate.is_approved);
        assert_eq!(candidate.votes_count, 0);
        assert_eq!(candidate.profile, application.profile);

        let response = client
            .post(uri!(apply(election.id)))
            .header(ContentType::JSON)
            .body(json!(application).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Conflict, response.status());
        assert_eq!(
            store.candidates_by_election(election.id).await.unwrap().len(),
            1
        );
    }

    #[backend_test]
    async fn apply_validates_input(client: Client, store: MemoryStore) {
        let election = fixtures::active_election(&store).await;
        let blank = json!({
            "user_id": Id::new().to_string(),
            "post": "provost",
            "manifesto": "",
        });
        let response = client
            .post(uri!(apply(election.id)))
            .header(ContentType::JSON)
            .body(blank.to_string())
            .dispatch()
            .await;
        assert_eq!(Status::BadRequest, response.status());

        let unknown_post = json!({
            "user_id": Id::new().to_string(),
            "post": "treasurer",
            "manifesto": "Transparency",
        });
        let response = client
            .post(uri!(apply(election.id)))
            .header(ContentType::JSON)
            .body(unknown_post.to_string())
            .dispatch()
            .await;
        assert_eq!(Status::UnprocessableEntity, response.status());
    }
}
