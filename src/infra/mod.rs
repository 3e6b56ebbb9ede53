//! Backend access and bundled reference data.

pub mod api;
pub mod seed;
