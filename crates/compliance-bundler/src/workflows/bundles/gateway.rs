use async_trait::async_trait;

use super::domain::{
    AccountCredentials, AddressRequest, AddressSid, BundleRequest, BundleSid, BundleStatus,
    BundleSummary, DocumentSid, DocumentUpload, EndUserRequest, EndUserSid, ItemAssignmentSid,
    SubAccount,
};

/// The sole boundary between the provisioning workflow and the vendor API.
/// Every call acts as the account named by `credentials`; the workflow layer
/// never sees a URL or an HTTP status.
#[async_trait]
pub trait ComplianceGateway: Send + Sync {
    async fn list_subaccounts(
        &self,
        credentials: &AccountCredentials,
        limit: usize,
    ) -> Result<Vec<SubAccount>, GatewayError>;

    async fn list_bundles(
        &self,
        credentials: &AccountCredentials,
        limit: usize,
    ) -> Result<Vec<BundleSummary>, GatewayError>;

    async fn create_address(
        &self,
        credentials: &AccountCredentials,
        request: AddressRequest,
    ) -> Result<AddressSid, GatewayError>;

    async fn create_bundle(
        &self,
        credentials: &AccountCredentials,
        request: BundleRequest,
    ) -> Result<BundleSid, GatewayError>;

    async fn create_end_user(
        &self,
        credentials: &AccountCredentials,
        request: EndUserRequest,
    ) -> Result<EndUserSid, GatewayError>;

    /// Multipart upload against the dedicated document endpoint.
    async fn upload_document(
        &self,
        credentials: &AccountCredentials,
        upload: DocumentUpload,
    ) -> Result<DocumentSid, GatewayError>;

    async fn assign_item(
        &self,
        credentials: &AccountCredentials,
        bundle: &BundleSid,
        object_sid: &str,
    ) -> Result<ItemAssignmentSid, GatewayError>;

    async fn update_bundle(
        &self,
        credentials: &AccountCredentials,
        bundle: &BundleSid,
        friendly_name: &str,
        status: BundleStatus,
    ) -> Result<(), GatewayError>;
}

/// Failure surfaced by a gateway implementation.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("api returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("unexpected response payload: {0}")]
    Payload(String),
}
