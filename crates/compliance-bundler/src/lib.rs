//! Provisioning of regulatory compliance bundles across telephony
//! sub-accounts.
//!
//! The crate walks every sub-account under a parent account, checks whether
//! an approved bundle already exists, and if not drives the fixed sequence of
//! vendor API calls that submits a new bundle for review: two addresses, a
//! bundle, an end-user, the supporting-document uploads, the item
//! assignments, and the final status update.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
