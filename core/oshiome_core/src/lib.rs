//! # Oshiome Domain Core
//!
//! Pure domain library for the oshiome crowdfunding service: campaigns
//! seeking pledges toward a monetary goal, contributions finalized by an
//! external payment gateway, and the derived funding-progress metrics the
//! rest of the system displays.
//!
//! | Concern       | Module                                   |
//! |---------------|------------------------------------------|
//! | Data model    | [`types`]                                |
//! | Aggregation   | [`aggregate`]                            |
//! | Lifecycle     | [`lifecycle`]                            |
//! | Normalization | [`normalize`]                            |
//! | Favorites     | [`favorites`]                            |
//! | Errors        | [`errors`]                               |
//!
//! Everything in this crate is synchronous and side-effect free apart from
//! the explicit load/save boundary in [`favorites`]. Persistence, HTTP,
//! and the gateway integration live in the `server` crate.

pub mod aggregate;
pub mod errors;
pub mod favorites;
pub mod lifecycle;
pub mod normalize;
pub mod types;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_aggregate;
#[cfg(test)]
mod test_lifecycle;

pub use aggregate::{aggregate, FundingProgress};
pub use errors::DomainError;
pub use types::{Campaign, CampaignStatus, Contribution, PaymentStatus, Pledge};
