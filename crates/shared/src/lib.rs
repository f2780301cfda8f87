//! Types shared between the workflow hub service and its clients.

pub mod domain;
pub mod protocol;
