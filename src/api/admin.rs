use rocket::{
    serde::json::{Error as JsonError, Json},
    Route, State,
};

use crate::{
    election::{Candidate, ElectionStatus, NewCandidate, TallyReport, Voter},
    error::{Error, Result},
    model::{
        api::{
            admin::AdminCredentials,
            auth::AuthToken,
            candidate::CandidateRegistration,
            election::{EndRequest, StartRequest},
        },
        db::{Admin, AdminStore, ElectionStore},
    },
};

pub fn routes() -> Vec<Route> {
    routes![
        get_admins,
        create_admin,
        delete_admin,
        register_candidate,
        start_election,
        end_election,
        release_results,
        reset_election,
        results_admin,
        get_voters,
        get_candidates,
        remove_voter,
        remove_candidate,
    ]
}

#[get("/admins")]
async fn get_admins(_token: AuthToken<Admin>, admins: &State<AdminStore>) -> Json<Vec<String>> {
    Json(admins.usernames().await)
}

#[post("/admins", data = "<new_admin>", format = "json")]
async fn create_admin(
    _token: AuthToken<Admin>,
    new_admin: Json<AdminCredentials>,
    admins: &State<AdminStore>,
) -> Result<()> {
    let admin = Admin::try_from(new_admin.0)?;
    admins.create(admin).await
}

#[delete("/admins/<username>")]
async fn delete_admin(
    _token: AuthToken<Admin>,
    username: &str,
    admins: &State<AdminStore>,
) -> Result<()> {
    admins.delete(username).await
}

#[post("/candidates", data = "<candidate>", format = "json")]
async fn register_candidate(
    _token: AuthToken<Admin>,
    candidate: Json<CandidateRegistration>,
    store: &State<ElectionStore>,
) -> Result<()> {
    let candidate = NewCandidate::try_from(candidate.0)?;
    store.register_candidate(candidate).await
}

/// A JSON body that may be left out entirely, meaning all defaults.
fn optional_body<T: Default>(body: std::result::Result<Json<T>, JsonError<'_>>) -> Result<T> {
    match body {
        Ok(Json(request)) => Ok(request),
        Err(JsonError::Parse(raw, _)) if raw.trim().is_empty() => Ok(T::default()),
        Err(JsonError::Parse(_, err)) => Err(Error::bad_request(format!("Invalid body: {err}"))),
        Err(JsonError::Io(err)) => Err(Error::bad_request(format!("Unreadable body: {err}"))),
    }
}

#[post("/election/start", data = "<request>")]
async fn start_election(
    _token: AuthToken<Admin>,
    request: std::result::Result<Json<StartRequest>, JsonError<'_>>,
    store: &State<ElectionStore>,
) -> Result<Json<ElectionStatus>> {
    let request = optional_body(request)?;
    Ok(Json(store.start_election(request.start_time).await?))
}

#[post("/election/end", data = "<request>")]
async fn end_election(
    _token: AuthToken<Admin>,
    request: std::result::Result<Json<EndRequest>, JsonError<'_>>,
    store: &State<ElectionStore>,
) -> Result<Json<ElectionStatus>> {
    let request = optional_body(request)?;
    let status = store
        .end_election(request.end_time, request.release_results)
        .await?;
    Ok(Json(status))
}

#[post("/election/release")]
async fn release_results(
    _token: AuthToken<Admin>,
    store: &State<ElectionStore>,
) -> Result<Json<ElectionStatus>> {
    Ok(Json(store.release_results().await?))
}

#[post("/election/reset")]
async fn reset_election(
    _token: AuthToken<Admin>,
    store: &State<ElectionStore>,
) -> Result<Json<ElectionStatus>> {
    Ok(Json(store.reset_election().await?))
}

/// Admins see the tally whether or not it has been released.
#[get("/results", rank = 1)]
async fn results_admin(
    _token: AuthToken<Admin>,
    store: &State<ElectionStore>,
) -> Result<Json<TallyReport>> {
    Ok(Json(store.service().compute_results(true)?))
}

#[get("/admin/voters")]
async fn get_voters(_token: AuthToken<Admin>, store: &State<ElectionStore>) -> Json<Vec<Voter>> {
    Json(store.service().voters())
}

#[get("/admin/candidates")]
async fn get_candidates(
    _token: AuthToken<Admin>,
    store: &State<ElectionStore>,
) -> Json<Vec<Candidate>> {
    Json(store.service().candidates())
}

#[delete("/admin/voters/<username>")]
async fn remove_voter(
    _token: AuthToken<Admin>,
    username: &str,
    store: &State<ElectionStore>,
) -> Result<()> {
    store.remove_voter(username).await
}

#[delete("/admin/candidates/<party_name>")]
async fn remove_candidate(
    _token: AuthToken<Admin>,
    party_name: &str,
    store: &State<ElectionStore>,
) -> Result<()> {
    store.remove_candidate(party_name).await
}

#[cfg(test)]
mod tests {
    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::Client,
        serde::json::{serde_json, serde_json::json, Value},
    };

    use crate::election::{Outcome, Phase};
    use crate::error::ErrorBody;
    use crate::model::{api::voter::VoterRegistration, db::admin::DEFAULT_ADMIN_USERNAME};

    use super::*;

    async fn register_candidates(client: &Client, parties: &[(&str, &str)]) {
        for (party, leader) in parties {
            let response = client
                .post(uri!(register_candidate))
                .header(ContentType::JSON)
                .body(json!(CandidateRegistration::example(party, leader)).to_string())
                .dispatch()
                .await;
            assert_eq!(Status::Ok, response.status());
        }
    }

    async fn error_code(response: rocket::local::asynchronous::LocalResponse<'_>) -> String {
        let raw_response = response.into_string().await.unwrap();
        serde_json::from_str::<ErrorBody>(&raw_response)
            .unwrap()
            .code
    }

    #[backend_test(admin)]
    async fn get_admins_lists_default(client: Client) {
        let response = client.get(uri!(get_admins)).dispatch().await;

        assert_eq!(Status::Ok, response.status());
        let raw_response = response.into_string().await.unwrap();
        let admins = serde_json::from_str::<Vec<String>>(&raw_response).unwrap();
        assert_eq!(admins, vec![DEFAULT_ADMIN_USERNAME]);
    }

    #[backend_test(admin)]
    async fn create_and_delete_admin(client: Client) {
        let response = client
            .post(uri!(create_admin))
            .header(ContentType::JSON)
            .body(json!(AdminCredentials::example1()).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());

        // Usernames are unique.
        let response = client
            .post(uri!(create_admin))
            .header(ContentType::JSON)
            .body(json!(AdminCredentials::example1()).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::BadRequest, response.status());

        // Short passwords are refused.
        let response = client
            .post(uri!(create_admin))
            .header(ContentType::JSON)
            .body(json!({"username": "shorty", "password": "abc"}).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::BadRequest, response.status());

        let response = client
            .delete(uri!(delete_admin("alice112")))
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());

        // Cannot delete the last one.
        let response = client
            .delete(uri!(delete_admin(DEFAULT_ADMIN_USERNAME)))
            .dispatch()
            .await;
        assert_eq!(Status::UnprocessableEntity, response.status());
    }

    #[backend_test]
    async fn admin_routes_need_admin(client: Client) {
        let response = client.post(uri!(reset_election)).dispatch().await;
        assert_eq!(Status::NotFound, response.status());

        let response = client
            .post(uri!(register_candidate))
            .header(ContentType::JSON)
            .body(json!(CandidateRegistration::example("Red", "Ann")).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::NotFound, response.status());
    }

    #[backend_test(admin)]
    async fn duplicate_candidate(client: Client) {
        register_candidates(&client, &[("Red", "Ann")]).await;

        let response = client
            .post(uri!(register_candidate))
            .header(ContentType::JSON)
            .body(json!(CandidateRegistration::example("Red", "Someone Else")).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::BadRequest, response.status());
        assert_eq!(error_code(response).await, "DuplicateId");

        let response = client
            .post(uri!(register_candidate))
            .header(ContentType::JSON)
            .body(json!(CandidateRegistration::example("", "Nobody")).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::BadRequest, response.status());
        assert_eq!(error_code(response).await, "MissingField");
    }

    #[backend_test(admin)]
    async fn lifecycle_transitions(client: Client) {
        // Cannot end or release before starting.
        let response = client
            .post(uri!(end_election))
            .header(ContentType::JSON)
            .body(json!(EndRequest::default()).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Conflict, response.status());
        assert_eq!(error_code(response).await, "InvalidTransition");

        let response = client
            .post(uri!(start_election))
            .header(ContentType::JSON)
            .body("{}")
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let raw_response = response.into_string().await.unwrap();
        let status = serde_json::from_str::<ElectionStatus>(&raw_response).unwrap();
        assert_eq!(status.state.phase, Phase::Active);
        assert!(status.state.started_at.is_some());

        // Starting twice is refused.
        let response = client
            .post(uri!(start_election))
            .header(ContentType::JSON)
            .body("{}")
            .dispatch()
            .await;
        assert_eq!(Status::Conflict, response.status());

        // An explicit end before the start is refused.
        let response = client
            .post(uri!(end_election))
            .header(ContentType::JSON)
            .body(json!({"end_time": "2000-01-01T00:00:00Z"}).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::BadRequest, response.status());
        assert_eq!(error_code(response).await, "InvalidTimeOrdering");

        let response = client
            .post(uri!(end_election))
            .header(ContentType::JSON)
            .body(json!(EndRequest::default()).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let raw_response = response.into_string().await.unwrap();
        let ended = serde_json::from_str::<ElectionStatus>(&raw_response).unwrap();
        assert_eq!(ended.state.phase, Phase::Closed);
        assert!(!ended.state.results_released);
        assert!(ended.version > status.version);

        let response = client.post(uri!(release_results)).dispatch().await;
        assert_eq!(Status::Ok, response.status());

        let response = client.post(uri!(release_results)).dispatch().await;
        assert_eq!(Status::Conflict, response.status());
        assert_eq!(error_code(response).await, "AlreadyReleased");

        let response = client.post(uri!(reset_election)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let raw_response = response.into_string().await.unwrap();
        let reset = serde_json::from_str::<ElectionStatus>(&raw_response).unwrap();
        assert_eq!(reset.state.phase, Phase::Pending);
        assert_eq!(reset.state.started_at, None);
        assert!(!reset.state.results_released);
    }

    #[backend_test(admin)]
    async fn recreated_admin_needs_new_login(client: Client) {
        let admins = client.rocket().state::<AdminStore>().unwrap();
        admins
            .create(Admin::try_from(AdminCredentials::example1()).unwrap())
            .await
            .unwrap();
        admins.delete(DEFAULT_ADMIN_USERNAME).await.unwrap();
        let recreated = AdminCredentials {
            username: DEFAULT_ADMIN_USERNAME.to_string(),
            password: crate::TEST_ADMIN_PASSWORD.to_string(),
        };
        admins
            .create(Admin::try_from(recreated.clone()).unwrap())
            .await
            .unwrap();

        let response = client.get(uri!(get_admins)).dispatch().await;
        assert_eq!(Status::NotFound, response.status());

        let response = client
            .post("/auth/admin")
            .header(ContentType::JSON)
            .body(json!(recreated).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let response = client.get(uri!(get_admins)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
    }

    #[backend_test(admin)]
    async fn lifecycle_without_bodies(client: Client) {
        let response = client.post(uri!(start_election)).dispatch().await;
        assert_eq!(Status::Ok, response.status());

        let response = client
            .post(uri!(end_election))
            .header(ContentType::JSON)
            .body("{not json")
            .dispatch()
            .await;
        assert_eq!(Status::BadRequest, response.status());

        let response = client.post(uri!(end_election)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let raw_response = response.into_string().await.unwrap();
        let status = serde_json::from_str::<ElectionStatus>(&raw_response).unwrap();
        assert_eq!(status.state.phase, Phase::Closed);
        assert!(!status.state.results_released);
    }

    #[backend_test(admin)]
    async fn admin_sees_unreleased_results(client: Client) {
        register_candidates(&client, &[("Red", "Ann"), ("Blue", "Bo")]).await;

        let response = client.get(uri!(results_admin)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let raw_response = response.into_string().await.unwrap();
        let report = serde_json::from_str::<TallyReport>(&raw_response).unwrap();
        assert_eq!(report.total_votes, 0);
        assert_eq!(report.outcome, Outcome::NoWinner);
        assert_eq!(report.results.len(), 2);
        assert_eq!(report.results[0].party_name, "Red");
    }

    #[backend_test(admin)]
    async fn list_and_remove_registrations(client: Client) {
        register_candidates(&client, &[("Red", "Ann"), ("Blue", "Bo")]).await;
        let response = client
            .post("/voters")
            .header(ContentType::JSON)
            .body(json!(VoterRegistration::example()).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());

        let response = client.get(uri!(get_voters)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let raw_response = response.into_string().await.unwrap();
        let voters = serde_json::from_str::<Vec<Value>>(&raw_response).unwrap();
        assert_eq!(voters.len(), 1);
        assert_eq!(voters[0]["username"], "ada1815");
        assert_eq!(voters[0]["has_voted"], false);
        // Credentials are never sent out.
        assert!(voters[0].get("credential").is_none());

        let response = client.get(uri!(get_candidates)).dispatch().await;
        let raw_response = response.into_string().await.unwrap();
        let candidates = serde_json::from_str::<Vec<Value>>(&raw_response).unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[1]["party_name"], "Blue");
        assert_eq!(candidates[1]["vote_count"], 0);
        assert!(candidates[1].get("credential").is_none());

        let response = client
            .delete(uri!(remove_candidate("Blue")))
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let response = client
            .delete(uri!(remove_voter("ada1815")))
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let response = client
            .delete(uri!(remove_voter("ada1815")))
            .dispatch()
            .await;
        assert_eq!(Status::NotFound, response.status());

        let store = client.rocket().state::<ElectionStore>().unwrap();
        assert_eq!(store.service().candidates().len(), 1);
        assert!(store.service().voters().is_empty());
    }
}
