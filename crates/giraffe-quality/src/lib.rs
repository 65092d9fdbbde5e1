//! Giraffe Kitchens quality management: weighted manager review scoring and
//! the sanitation audit deduction model, with the HTTP routers that expose them.

pub mod audits;
pub mod branches;
pub mod config;
pub mod error;
pub mod import;
pub mod repository;
pub mod reviews;
pub mod scoring;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod testing;
