use rocket::{serde::json::Json, Route, State};

use crate::{
    election::{ElectionStatus, NewVoter, TallyReport},
    error::Result,
    model::{
        api::{candidate::BallotOption, voter::VoterRegistration},
        db::ElectionStore,
    },
};

pub fn routes() -> Vec<Route> {
    routes![register_voter, election_state, results_non_admin, candidates]
}

/// Anyone may sign up to vote; eligibility is checked against the current year.
#[post("/voters", data = "<registration>", format = "json")]
async fn register_voter(
    registration: Json<VoterRegistration>,
    store: &State<ElectionStore>,
) -> Result<()> {
    let voter = NewVoter::try_from(registration.0)?;
    store.register_voter(voter).await
}

#[get("/election")]
fn election_state(store: &State<ElectionStore>) -> Json<ElectionStatus> {
    Json(store.service().election_state())
}

#[get("/results", rank = 2)]
fn results_non_admin(store: &State<ElectionStore>) -> Result<Json<TallyReport>> {
    Ok(Json(store.service().compute_results(false)?))
}

/// The choices on the ballot, in registration order.
#[get("/candidates")]
fn candidates(store: &State<ElectionStore>) -> Json<Vec<BallotOption>> {
    Json(
        store
            .service()
            .candidates()
            .into_iter()
            .map(BallotOption::from)
            .collect(),
    )
}
