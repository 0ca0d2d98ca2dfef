use rocket::{serde::json::Json, Route, State};

use crate::{
    election::Candidate,
    error::{Error, Result},
    model::{
        api::{auth::AuthToken, candidate::CandidateStatus},
        db::ElectionStore,
    },
};

pub fn routes() -> Vec<Route> {
    routes![candidate_status]
}

/// A candidate's own entry, with its count once results are public.
#[get("/candidate/status")]
fn candidate_status(
    token: AuthToken<Candidate>,
    store: &State<ElectionStore>,
) -> Result<Json<CandidateStatus>> {
    let service = store.service();
    let candidate = service
        .candidate(&token.id)
        .ok_or_else(|| Error::not_found(format!("Candidate {}", token.id)))?;
    let released = service.election_state().state.results_released;
    Ok(Json(CandidateStatus::new(candidate, released)))
}

#[cfg(test)]
mod tests {
    use rocket::{
        http::Status,
        local::asynchronous::Client,
        serde::json::serde_json,
    };

    use crate::election::{NewCandidate, NewVoter};

    use super::*;

    async fn fetch_status(client: &Client) -> CandidateStatus {
        let response = client.get(uri!(candidate_status)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let raw_response = response.into_string().await.unwrap();
        serde_json::from_str::<CandidateStatus>(&raw_response).unwrap()
    }

    #[backend_test(candidate)]
    async fn count_hidden_until_released(client: Client) {
        let store = client.rocket().state::<ElectionStore>().unwrap();
        store
            .register_voter(NewVoter::example("v1"))
            .await
            .unwrap();
        store.start_election(None).await.unwrap();
        store.cast_vote("v1", "Red").await.unwrap();

        let status = fetch_status(&client).await;
        assert_eq!(status.party_name, "Red");
        assert_eq!(status.leader_name, "Ann");
        assert_eq!(status.vote_count, None);

        store.end_election(None, true).await.unwrap();
        let status = fetch_status(&client).await;
        assert_eq!(status.vote_count, Some(1));
    }

    #[backend_test(candidate)]
    async fn old_cookie_rejected_after_reregistration(client: Client) {
        let store = client.rocket().state::<ElectionStore>().unwrap();
        store.remove_candidate("Red").await.unwrap();
        store
            .register_candidate(NewCandidate::example("Red", "Someone Else"))
            .await
            .unwrap();

        let response = client.get(uri!(candidate_status)).dispatch().await;
        assert_eq!(Status::NotFound, response.status());
    }

    #[backend_test(voter)]
    async fn voters_are_not_candidates(client: Client) {
        let response = client.get(uri!(candidate_status)).dispatch().await;
        assert_eq!(Status::NotFound, response.status());
    }
}
