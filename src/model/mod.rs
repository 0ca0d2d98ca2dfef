//! Everything that crosses a boundary: the wire (`api`) and the database (`db`, `mongodb`).

pub mod api;
pub mod db;
pub mod mongodb;
