use rocket::{
    http::{Cookie, CookieJar, Status},
    serde::json::Json,
    Route, State,
};

use crate::{
    config::Config,
    error::{Error, Result},
    model::{
        api::{
            admin::AdminCredentials,
            auth::{verify_password, AuthToken, AUTH_TOKEN_COOKIE},
            candidate::CandidateCredentials,
            voter::VoterCredentials,
        },
        db::{AdminStore, ElectionStore},
    },
};

pub fn routes() -> Vec<Route> {
    routes![
        authenticate_admin,
        authenticate_voter,
        authenticate_candidate,
        logout
    ]
}

#[post("/auth/admin", data = "<credentials>", format = "json")]
pub async fn authenticate_admin(
    cookies: &CookieJar<'_>,
    credentials: Json<AdminCredentials>,
    admins: &State<AdminStore>,
    config: &State<Config>,
) -> Result<()> {
    let admin = admins
        .find(&credentials.username)
        .await
        .ok_or_else(Error::bad_login)?;
    if !admin.verify_password(&credentials.password)? {
        return Err(Error::bad_login());
    }

    let token = AuthToken::new(&admin);
    cookies.add(token.into_cookie(config)?);

    Ok(())
}

#[post("/auth/voter", data = "<credentials>", format = "json")]
pub async fn authenticate_voter(
    cookies: &CookieJar<'_>,
    credentials: Json<VoterCredentials>,
    store: &State<ElectionStore>,
    config: &State<Config>,
) -> Result<()> {
    let voter = store
        .service()
        .voter(&credentials.username)
        .ok_or_else(Error::bad_login)?;
    if !verify_password(&voter.credential, &credentials.password)? {
        return Err(Error::bad_login());
    }

    let token = AuthToken::new(&voter);
    cookies.add(token.into_cookie(config)?);

    Ok(())
}

#[post("/auth/candidate", data = "<credentials>", format = "json")]
pub async fn authenticate_candidate(
    cookies: &CookieJar<'_>,
    credentials: Json<CandidateCredentials>,
    store: &State<ElectionStore>,
    config: &State<Config>,
) -> Result<()> {
    let candidate = store
        .service()
        .candidate(&credentials.party_name)
        .ok_or_else(Error::bad_login)?;
    if !verify_password(&candidate.credential, &credentials.password)? {
        return Err(Error::bad_login());
    }

    let token = AuthToken::new(&candidate);
    cookies.add(token.into_cookie(config)?);

    Ok(())
}

#[delete("/auth")]
pub fn logout(cookies: &CookieJar) -> Status {
    cookies.remove(Cookie::named(AUTH_TOKEN_COOKIE));
    Status::Ok
}
