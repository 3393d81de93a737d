#![doc = "The `teamflow` library crate."]
#![doc = ""]
#![doc = "This crate contains the authentication and session-management core of the"]
#![doc = "TeamFlow project-management API: password verification, access/refresh token"]
#![doc = "issuance, refresh-token rotation and revocation, plus the HTTP controllers,"]
#![doc = "configuration, and error handling around it. It is used by the main binary"]
#![doc = "(`main.rs`) to construct and run the application."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;
