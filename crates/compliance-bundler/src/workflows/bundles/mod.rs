//! Sub-account walking and regulatory bundle provisioning.
//!
//! The walker enumerates sub-accounts and decides, per account, whether a
//! bundle submission is needed; the provisioner drives the fixed sequence of
//! vendor calls that creates and submits one bundle. Both sit behind the
//! [`gateway::ComplianceGateway`] trait so the suites in `tests/` can script
//! the vendor side.

pub mod documents;
pub mod domain;
pub mod gateway;
pub mod provisioner;
pub mod report;
pub mod twilio;
pub mod walker;

#[cfg(test)]
mod tests;

pub use documents::{DocumentError, DocumentFile, DocumentLibrary};
pub use domain::{
    AccountCredentials, AccountSid, AddressRequest, AddressSid, BundleRequest, BundleSid,
    BundleStatus, BundleSummary, DocumentKind, DocumentSid, DocumentUpload, EndUserRequest,
    EndUserSid, ItemAssignmentSid, SubAccount,
};
pub use gateway::{ComplianceGateway, GatewayError};
pub use provisioner::{
    BundleProvisioner, ProvisionError, ProvisionReceipt, ProvisionStep, StepError,
};
pub use report::{AccountDisposition, AccountOutcome, AccountSurvey, RunSummary};
pub use twilio::TwilioClient;
pub use walker::{AccountWalker, WalkError, MAX_BUNDLES, MAX_SUBACCOUNTS};
