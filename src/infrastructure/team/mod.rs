//! Team management

pub mod service;

pub use service::{CreateTeamRequest, TeamService};
