//! newsredirect - daily redirects to newspaper e-editions.
//!
//! Keeps a redirect target per newspaper: date and monthly editions follow a
//! URL pattern, sequence editions follow an issue id that a daily job
//! advances and verifies against the publisher.

pub mod cli;
pub mod clock;
pub mod config;
pub mod models;
pub mod repository;
pub mod schema;
pub mod server;
pub mod services;
