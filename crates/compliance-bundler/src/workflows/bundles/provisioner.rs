use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use super::documents::{DocumentError, DocumentLibrary};
use super::domain::{
    AccountCredentials, AddressRequest, AddressSid, BundleRequest, BundleSid, BundleStatus,
    DocumentSid, DocumentUpload, EndUserRequest, EndUserSid, ItemAssignmentSid,
};
use super::gateway::{ComplianceGateway, GatewayError};
use crate::config::ProvisionerConfig;

/// The ordered steps of one provisioning run. Later steps consume SIDs
/// produced by earlier ones, so the order is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisionStep {
    BusinessAddress,
    PersonalAddress,
    Bundle,
    EndUser,
    CorporateRegistryUpload,
    PowerOfAttorneyUpload,
    DriversLicenseUpload,
    EndUserAssignment,
    CorporateRegistryAssignment,
    PowerOfAttorneyAssignment,
    DriversLicenseAssignment,
    BundleSubmission,
}

impl ProvisionStep {
    pub const fn label(self) -> &'static str {
        match self {
            Self::BusinessAddress => "business address",
            Self::PersonalAddress => "personal address",
            Self::Bundle => "bundle",
            Self::EndUser => "end-user",
            Self::CorporateRegistryUpload => "corporate registry upload",
            Self::PowerOfAttorneyUpload => "power of attorney upload",
            Self::DriversLicenseUpload => "driver's license upload",
            Self::EndUserAssignment => "end-user assignment",
            Self::CorporateRegistryAssignment => "corporate registry assignment",
            Self::PowerOfAttorneyAssignment => "power of attorney assignment",
            Self::DriversLicenseAssignment => "driver's license assignment",
            Self::BundleSubmission => "bundle submission",
        }
    }
}

/// Per-run context record: one named field per step output. Created remote
/// records are never rolled back, so on failure the receipt doubles as the
/// list of orphans an operator may want to clean up.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProvisionReceipt {
    pub business_address: Option<AddressSid>,
    pub personal_address: Option<AddressSid>,
    pub bundle: Option<BundleSid>,
    pub end_user: Option<EndUserSid>,
    pub corporate_registry: Option<DocumentSid>,
    pub power_of_attorney: Option<DocumentSid>,
    pub drivers_license: Option<DocumentSid>,
    pub item_assignments: Vec<ItemAssignmentSid>,
    pub submitted: bool,
}

#[derive(Debug, thiserror::Error)]
#[error("{} failed: {source}", .step.label())]
pub struct ProvisionError {
    pub step: ProvisionStep,
    pub source: StepError,
}

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Document(#[from] DocumentError),
}

fn fail<E: Into<StepError>>(step: ProvisionStep) -> impl FnOnce(E) -> ProvisionError {
    move |source| ProvisionError {
        step,
        source: source.into(),
    }
}

/// Drives the fixed create/upload/assign/update sequence for one
/// sub-account. Short-circuits on the first failing step; already-created
/// records stay behind by design.
pub struct BundleProvisioner<G> {
    gateway: Arc<G>,
    config: Arc<ProvisionerConfig>,
    documents: DocumentLibrary,
    run_label: String,
}

impl<G: ComplianceGateway> BundleProvisioner<G> {
    pub fn new(gateway: Arc<G>, config: Arc<ProvisionerConfig>, run_label: String) -> Self {
        let documents = DocumentLibrary::new(config.documents.directory.clone());
        Self {
            gateway,
            config,
            documents,
            run_label,
        }
    }

    /// Run the full sequence for one sub-account. The receipt is returned
    /// alongside the result so a failure still exposes everything created
    /// before the failing step.
    pub async fn provision(
        &self,
        credentials: &AccountCredentials,
    ) -> (ProvisionReceipt, Result<(), ProvisionError>) {
        let mut receipt = ProvisionReceipt::default();
        let result = self.run_steps(credentials, &mut receipt).await;
        (receipt, result)
    }

    async fn run_steps(
        &self,
        credentials: &AccountCredentials,
        receipt: &mut ProvisionReceipt,
    ) -> Result<(), ProvisionError> {
        let config = &self.config;

        let business_address = self
            .gateway
            .create_address(credentials, AddressRequest::for_business(&config.business))
            .await
            .map_err(fail(ProvisionStep::BusinessAddress))?;
        info!(sid = %business_address, "business address created");
        receipt.business_address = Some(business_address.clone());

        let personal_address = self
            .gateway
            .create_address(credentials, AddressRequest::for_person(&config.person))
            .await
            .map_err(fail(ProvisionStep::PersonalAddress))?;
        info!(sid = %personal_address, "personal address created");
        receipt.personal_address = Some(personal_address.clone());

        let bundle = self
            .gateway
            .create_bundle(credentials, BundleRequest::for_submission(config))
            .await
            .map_err(fail(ProvisionStep::Bundle))?;
        info!(sid = %bundle, "bundle created");
        receipt.bundle = Some(bundle.clone());

        let end_user = self
            .gateway
            .create_end_user(
                credentials,
                EndUserRequest::business(&config.business, &config.person, &self.run_label),
            )
            .await
            .map_err(fail(ProvisionStep::EndUser))?;
        info!(sid = %end_user, "end-user created");
        receipt.end_user = Some(end_user.clone());

        let registry_file = self
            .documents
            .load(&config.documents.corporate_registry)
            .map_err(fail(ProvisionStep::CorporateRegistryUpload))?;
        let corporate_registry = self
            .gateway
            .upload_document(
                credentials,
                DocumentUpload::corporate_registry(
                    &config.business,
                    &config.person,
                    &business_address,
                    registry_file,
                    &self.run_label,
                ),
            )
            .await
            .map_err(fail(ProvisionStep::CorporateRegistryUpload))?;
        info!(sid = %corporate_registry, "corporate registry document uploaded");
        receipt.corporate_registry = Some(corporate_registry.clone());

        let power_of_attorney = match &config.documents.power_of_attorney {
            Some(file_name) => {
                let file = self
                    .documents
                    .load(file_name)
                    .map_err(fail(ProvisionStep::PowerOfAttorneyUpload))?;
                let sid = self
                    .gateway
                    .upload_document(
                        credentials,
                        DocumentUpload::power_of_attorney(
                            &config.person,
                            &business_address,
                            &personal_address,
                            file,
                            &self.run_label,
                        ),
                    )
                    .await
                    .map_err(fail(ProvisionStep::PowerOfAttorneyUpload))?;
                info!(sid = %sid, "power of attorney document uploaded");
                receipt.power_of_attorney = Some(sid.clone());
                Some(sid)
            }
            None => None,
        };

        let license_file = self
            .documents
            .load(&config.documents.drivers_license)
            .map_err(fail(ProvisionStep::DriversLicenseUpload))?;
        let drivers_license = self
            .gateway
            .upload_document(
                credentials,
                DocumentUpload::drivers_license(
                    &config.person,
                    &personal_address,
                    license_file,
                    &self.run_label,
                ),
            )
            .await
            .map_err(fail(ProvisionStep::DriversLicenseUpload))?;
        info!(sid = %drivers_license, "driver's license document uploaded");
        receipt.drivers_license = Some(drivers_license.clone());

        self.assign(
            credentials,
            &bundle,
            end_user.as_str(),
            ProvisionStep::EndUserAssignment,
            receipt,
        )
        .await?;

        self.assign(
            credentials,
            &bundle,
            corporate_registry.as_str(),
            ProvisionStep::CorporateRegistryAssignment,
            receipt,
        )
        .await?;

        if let Some(sid) = &power_of_attorney {
            self.assign(
                credentials,
                &bundle,
                sid.as_str(),
                ProvisionStep::PowerOfAttorneyAssignment,
                receipt,
            )
            .await?;
        }

        self.assign(
            credentials,
            &bundle,
            drivers_license.as_str(),
            ProvisionStep::DriversLicenseAssignment,
            receipt,
        )
        .await?;

        self.gateway
            .update_bundle(
                credentials,
                &bundle,
                &format!("Request at {}", self.run_label),
                BundleStatus::PendingReview,
            )
            .await
            .map_err(fail(ProvisionStep::BundleSubmission))?;
        info!(sid = %bundle, "bundle submitted for review");
        receipt.submitted = true;

        Ok(())
    }

    async fn assign(
        &self,
        credentials: &AccountCredentials,
        bundle: &BundleSid,
        object_sid: &str,
        step: ProvisionStep,
        receipt: &mut ProvisionReceipt,
    ) -> Result<(), ProvisionError> {
        let assignment = self
            .gateway
            .assign_item(credentials, bundle, object_sid)
            .await
            .map_err(fail(step))?;
        info!(sid = %assignment, object = object_sid, "item assigned");
        receipt.item_assignments.push(assignment);
        Ok(())
    }
}
