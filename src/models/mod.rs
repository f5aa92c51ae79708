//! Agent hub domain model and HTTP request/response contracts.
//!
//! `Agent` mirrors a row of the `agents` table; `AgentSummary` is the shape
//! clients see (string id, `title` for the name, derived `forkCount`).

mod entities;
mod requests;

pub use entities::*;
pub use requests::*;
