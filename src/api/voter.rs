use rocket::{serde::json::Json, Route, State};

use crate::{
    election::Voter,
    error::{Error, Result},
    model::{
        api::{
            auth::AuthToken,
            voter::{BallotChoice, VoterStatus},
        },
        db::ElectionStore,
    },
};

pub fn routes() -> Vec<Route> {
    routes![vote, voter_status]
}

/// Cast the logged-in voter's one ballot.
#[post("/voter/vote", data = "<choice>", format = "json")]
async fn vote(
    token: AuthToken<Voter>,
    choice: Json<BallotChoice>,
    store: &State<ElectionStore>,
) -> Result<()> {
    store.cast_vote(&token.id, &choice.party_name).await?;
    Ok(())
}

#[get("/voter/status")]
fn voter_status(token: AuthToken<Voter>, store: &State<ElectionStore>) -> Result<Json<VoterStatus>> {
    let voter = store
        .service()
        .voter(&token.id)
        .ok_or_else(|| Error::not_found(format!("Voter {}", token.id)))?;
    Ok(Json(voter.into()))
}

#[cfg(test)]
mod tests {
    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::Client,
        serde::json::{serde_json, serde_json::json},
    };

    use crate::election::{NewCandidate, Outcome};
    use crate::model::api::voter::{VoterCredentials, VoterRegistration};
    use crate::error::ErrorBody;

    use super::*;

    /// Register parties directly and open the election.
    async fn open_with_parties(client: &Client, parties: &[(&str, &str)]) {
        let store = client.rocket().state::<ElectionStore>().unwrap();
        for (party, leader) in parties {
            store
                .register_candidate(NewCandidate::example(party, leader))
                .await
                .unwrap();
        }
        store.start_election(None).await.unwrap();
    }

    async fn vote_for(client: &Client, party_name: &str) -> Status {
        client
            .post(uri!(vote))
            .header(ContentType::JSON)
            .body(json!({ "party_name": party_name }).to_string())
            .dispatch()
            .await
            .status()
    }

    #[backend_test(voter)]
    async fn vote_once(client: Client) {
        open_with_parties(&client, &[("Red", "Ann"), ("Blue", "Bo")]).await;

        assert_eq!(vote_for(&client, "Red").await, Status::Ok);

        let response = client
            .post(uri!(vote))
            .header(ContentType::JSON)
            .body(json!({ "party_name": "Blue" }).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Conflict, response.status());
        let raw_response = response.into_string().await.unwrap();
        let error = serde_json::from_str::<ErrorBody>(&raw_response).unwrap();
        assert_eq!(error.code, "AlreadyVoted");

        let store = client.rocket().state::<ElectionStore>().unwrap();
        let report = store.service().compute_results(true).unwrap();
        assert_eq!(report.total_votes, 1);
        assert_eq!(report.winners, vec!["Red"]);
        assert_eq!(report.outcome, Outcome::Winner);
    }

    #[backend_test(voter)]
    async fn vote_needs_active_election(client: Client) {
        let store = client.rocket().state::<ElectionStore>().unwrap();
        store
            .register_candidate(NewCandidate::example("Red", "Ann"))
            .await
            .unwrap();

        let response = client
            .post(uri!(vote))
            .header(ContentType::JSON)
            .body(json!({ "party_name": "Red" }).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Conflict, response.status());
        let raw_response = response.into_string().await.unwrap();
        let error = serde_json::from_str::<ErrorBody>(&raw_response).unwrap();
        assert_eq!(error.code, "ElectionNotActive");
        assert_eq!(store.service().candidate("Red").unwrap().vote_count, 0);
    }

    #[backend_test(voter)]
    async fn vote_for_unknown_party(client: Client) {
        open_with_parties(&client, &[("Red", "Ann")]).await;

        assert_eq!(vote_for(&client, "Purple").await, Status::NotFound);

        // The failed attempt did not use up the ballot.
        assert_eq!(vote_for(&client, "Red").await, Status::Ok);
    }

    #[backend_test]
    async fn vote_needs_voter(client: Client) {
        open_with_parties(&client, &[("Red", "Ann")]).await;

        assert_eq!(vote_for(&client, "Red").await, Status::NotFound);
    }

    #[backend_test(voter)]
    async fn status_tracks_ballot(client: Client) {
        open_with_parties(&client, &[("Red", "Ann")]).await;

        let response = client.get(uri!(voter_status)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let raw_response = response.into_string().await.unwrap();
        let status = serde_json::from_str::<VoterStatus>(&raw_response).unwrap();
        assert!(!status.has_voted);

        vote_for(&client, "Red").await;

        let response = client.get(uri!(voter_status)).dispatch().await;
        let raw_response = response.into_string().await.unwrap();
        let status = serde_json::from_str::<VoterStatus>(&raw_response).unwrap();
        assert_eq!(status.username, "ada1815");
        assert!(status.has_voted);
    }

    #[backend_test(voter)]
    async fn concurrent_double_vote(client: Client) {
        open_with_parties(&client, &[("Red", "Ann")]).await;

        // Fire the same voter's ballot several times at once.
        let attempts = (0..4).map(|_| vote_for(&client, "Red"));
        let statuses = rocket::futures::future::join_all(attempts).await;

        assert_eq!(statuses.iter().filter(|s| **s == Status::Ok).count(), 1);
        assert_eq!(
            statuses.iter().filter(|s| **s == Status::Conflict).count(),
            3
        );
        let store = client.rocket().state::<ElectionStore>().unwrap();
        assert_eq!(store.service().candidate("Red").unwrap().vote_count, 1);
        assert!(store.service().is_balanced());
    }

    #[backend_test(voter)]
    async fn removed_voter_loses_access(client: Client) {
        let store = client.rocket().state::<ElectionStore>().unwrap();
        store.remove_voter("ada1815").await.unwrap();

        let response = client.get(uri!(voter_status)).dispatch().await;
        assert_eq!(Status::NotFound, response.status());
    }

    #[backend_test(voter)]
    async fn old_cookie_rejected_after_reregistration(client: Client) {
        open_with_parties(&client, &[("Red", "Ann")]).await;
        let store = client.rocket().state::<ElectionStore>().unwrap();
        store.remove_voter("ada1815").await.unwrap();

        // Somebody else takes the freed username.
        let response = client
            .post("/voters")
            .header(ContentType::JSON)
            .body(json!(VoterRegistration::example()).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());

        // The cookie still held from the first account opens nothing.
        assert_eq!(vote_for(&client, "Red").await, Status::NotFound);
        let response = client.get(uri!(voter_status)).dispatch().await;
        assert_eq!(Status::NotFound, response.status());
        assert!(!store.service().voter("ada1815").unwrap().has_voted);

        // Logging in to the new account works as usual.
        let response = client
            .post("/auth/voter")
            .header(ContentType::JSON)
            .body(json!(VoterCredentials::example()).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        assert_eq!(vote_for(&client, "Red").await, Status::Ok);
    }
}
