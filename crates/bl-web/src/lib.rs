//! Builder dashboard web server.
//!
//! Pages are rendered server-side from the cached, filtered trade envelope.

pub mod pages;
pub mod routes;
pub mod state;
