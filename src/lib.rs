#[macro_use]
extern crate rocket;

#[macro_use]
extern crate log;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{figment::Figment, Build, Rocket};

pub mod api;
pub mod config;
pub mod election;
pub mod error;
pub mod logging;
pub mod model;

use config::{ConfigFairing, DatabaseFairing, ElectionFairing};
use logging::LoggerFairing;

/// Build the server from `Rocket.toml` and `ROCKET_*` environment variables.
pub fn build() -> Rocket<Build> {
    rocket_for_figment(rocket::Config::figment())
}

/// Build the server from the given configuration.
pub fn rocket_for_figment(figment: Figment) -> Rocket<Build> {
    rocket::custom(figment)
        .attach(LoggerFairing)
        .attach(ConfigFairing)
        .attach(DatabaseFairing)
        .attach(ElectionFairing)
        .mount("/", api::routes())
}

/// Password of the default admin in tests.
#[cfg(test)]
pub(crate) const TEST_ADMIN_PASSWORD: &str = "testadminpassword";

/// An in-memory server with fixed secrets, for tests.
#[cfg(test)]
pub(crate) fn test_rocket() -> Rocket<Build> {
    let figment = Figment::from(rocket::Config::debug_default())
        .merge(("log_level", "off"))
        .merge(("auth_ttl", 3600))
        .merge(("jwt_secret", "test jwt secret"))
        .merge(("default_admin_password", TEST_ADMIN_PASSWORD));
    rocket_for_figment(figment)
}
