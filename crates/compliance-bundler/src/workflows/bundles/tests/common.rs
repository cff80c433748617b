use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::TimeZone;
use serde_json::Value;

use crate::config::{
    BusinessProfile, DocumentConfig, EndpointConfig, PersonProfile, PostalAddress,
    ProvisionerConfig, TelemetryConfig,
};
use crate::workflows::bundles::domain::{
    AccountCredentials, AccountSid, AddressRequest, AddressSid, BundleRequest, BundleSid,
    BundleStatus, BundleSummary, DocumentKind, DocumentSid, DocumentUpload, EndUserRequest,
    EndUserSid, ItemAssignmentSid, SubAccount,
};
use crate::workflows::bundles::gateway::{ComplianceGateway, GatewayError};
use crate::workflows::bundles::walker::AccountWalker;

/// One recorded gateway interaction, payloads included, so suites can assert
/// the exact request sequence field-for-field.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum GatewayCall {
    ListSubaccounts {
        limit: usize,
    },
    ListBundles {
        account: String,
        limit: usize,
    },
    CreateAddress {
        account: String,
        request: AddressRequest,
    },
    CreateBundle {
        account: String,
        request: BundleRequest,
    },
    CreateEndUser {
        account: String,
        request: EndUserRequest,
    },
    UploadDocument {
        account: String,
        kind: DocumentKind,
        friendly_name: String,
        attributes: Value,
        file_name: String,
    },
    AssignItem {
        account: String,
        bundle: String,
        object_sid: String,
    },
    UpdateBundle {
        account: String,
        bundle: String,
        friendly_name: String,
        status: BundleStatus,
    },
}

/// Which operation the fake should reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum FailPoint {
    ListSubaccounts,
    ListBundles,
    CreateAddress,
    CreateBundle,
    CreateEndUser,
    UploadDocument(DocumentKind),
    AssignItem,
    UpdateBundle,
}

#[derive(Default)]
pub(super) struct FakeGateway {
    pub(super) accounts: Vec<SubAccount>,
    pub(super) bundles: HashMap<String, Vec<BundleSummary>>,
    pub(super) fail_point: Option<FailPoint>,
    /// When set, the fail point only fires for this account SID.
    pub(super) fail_only_account: Option<String>,
    pub(super) calls: Mutex<Vec<GatewayCall>>,
    sequence: AtomicU64,
}

impl FakeGateway {
    pub(super) fn new(accounts: Vec<SubAccount>) -> Self {
        Self {
            accounts,
            ..Self::default()
        }
    }

    pub(super) fn with_bundles(mut self, account: &str, bundles: Vec<BundleSummary>) -> Self {
        self.bundles.insert(account.to_string(), bundles);
        self
    }

    pub(super) fn failing_at(mut self, fail_point: FailPoint) -> Self {
        self.fail_point = Some(fail_point);
        self
    }

    pub(super) fn failing_only_for(mut self, account: &str) -> Self {
        self.fail_only_account = Some(account.to_string());
        self
    }

    pub(super) fn recorded_calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().expect("call mutex poisoned").clone()
    }

    fn record(&self, call: GatewayCall) {
        self.calls.lock().expect("call mutex poisoned").push(call);
    }

    fn next_sid(&self, prefix: &str) -> String {
        let n = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{prefix}{n}")
    }

    fn should_fail(&self, point: FailPoint, account: &AccountCredentials) -> bool {
        if self.fail_point != Some(point) {
            return false;
        }
        match &self.fail_only_account {
            Some(sid) => account.account_sid.as_str() == sid,
            None => true,
        }
    }

    fn injected_failure() -> GatewayError {
        GatewayError::Api {
            status: 503,
            body: "injected failure".to_string(),
        }
    }
}

#[async_trait]
impl ComplianceGateway for FakeGateway {
    async fn list_subaccounts(
        &self,
        credentials: &AccountCredentials,
        limit: usize,
    ) -> Result<Vec<SubAccount>, GatewayError> {
        self.record(GatewayCall::ListSubaccounts { limit });
        if self.should_fail(FailPoint::ListSubaccounts, credentials) {
            return Err(Self::injected_failure());
        }
        Ok(self.accounts.clone())
    }

    async fn list_bundles(
        &self,
        credentials: &AccountCredentials,
        limit: usize,
    ) -> Result<Vec<BundleSummary>, GatewayError> {
        self.record(GatewayCall::ListBundles {
            account: credentials.account_sid.0.clone(),
            limit,
        });
        if self.should_fail(FailPoint::ListBundles, credentials) {
            return Err(Self::injected_failure());
        }
        Ok(self
            .bundles
            .get(credentials.account_sid.as_str())
            .cloned()
            .unwrap_or_default())
    }

    async fn create_address(
        &self,
        credentials: &AccountCredentials,
        request: AddressRequest,
    ) -> Result<AddressSid, GatewayError> {
        self.record(GatewayCall::CreateAddress {
            account: credentials.account_sid.0.clone(),
            request,
        });
        if self.should_fail(FailPoint::CreateAddress, credentials) {
            return Err(Self::injected_failure());
        }
        Ok(AddressSid(self.next_sid("AD")))
    }

    async fn create_bundle(
        &self,
        credentials: &AccountCredentials,
        request: BundleRequest,
    ) -> Result<BundleSid, GatewayError> {
        self.record(GatewayCall::CreateBundle {
            account: credentials.account_sid.0.clone(),
            request,
        });
        if self.should_fail(FailPoint::CreateBundle, credentials) {
            return Err(Self::injected_failure());
        }
        Ok(BundleSid(self.next_sid("BU")))
    }

    async fn create_end_user(
        &self,
        credentials: &AccountCredentials,
        request: EndUserRequest,
    ) -> Result<EndUserSid, GatewayError> {
        self.record(GatewayCall::CreateEndUser {
            account: credentials.account_sid.0.clone(),
            request,
        });
        if self.should_fail(FailPoint::CreateEndUser, credentials) {
            return Err(Self::injected_failure());
        }
        Ok(EndUserSid(self.next_sid("IT")))
    }

    async fn upload_document(
        &self,
        credentials: &AccountCredentials,
        upload: DocumentUpload,
    ) -> Result<DocumentSid, GatewayError> {
        self.record(GatewayCall::UploadDocument {
            account: credentials.account_sid.0.clone(),
            kind: upload.kind,
            friendly_name: upload.friendly_name.clone(),
            attributes: upload.attributes.clone(),
            file_name: upload.file.file_name.clone(),
        });
        if self.should_fail(FailPoint::UploadDocument(upload.kind), credentials) {
            return Err(Self::injected_failure());
        }
        Ok(DocumentSid(self.next_sid("RD")))
    }

    async fn assign_item(
        &self,
        credentials: &AccountCredentials,
        bundle: &BundleSid,
        object_sid: &str,
    ) -> Result<ItemAssignmentSid, GatewayError> {
        self.record(GatewayCall::AssignItem {
            account: credentials.account_sid.0.clone(),
            bundle: bundle.0.clone(),
            object_sid: object_sid.to_string(),
        });
        if self.should_fail(FailPoint::AssignItem, credentials) {
            return Err(Self::injected_failure());
        }
        Ok(ItemAssignmentSid(self.next_sid("BV")))
    }

    async fn update_bundle(
        &self,
        credentials: &AccountCredentials,
        bundle: &BundleSid,
        friendly_name: &str,
        status: BundleStatus,
    ) -> Result<(), GatewayError> {
        self.record(GatewayCall::UpdateBundle {
            account: credentials.account_sid.0.clone(),
            bundle: bundle.0.clone(),
            friendly_name: friendly_name.to_string(),
            status,
        });
        if self.should_fail(FailPoint::UpdateBundle, credentials) {
            return Err(Self::injected_failure());
        }
        Ok(())
    }
}

pub(super) fn sample_config(
    documents_dir: &Path,
    power_of_attorney: Option<&str>,
) -> ProvisionerConfig {
    ProvisionerConfig {
        account_sid: "ACparent".to_string(),
        auth_token: "parent-token".to_string(),
        number_type: "national".to_string(),
        business: BusinessProfile {
            name: "Acme Telephony KK".to_string(),
            description: "Cloud telephony reseller".to_string(),
            email: "compliance@acme.example".to_string(),
            address: PostalAddress {
                street: "1-2-3 Shibakoen".to_string(),
                city: "Minato-ku".to_string(),
                region: "Tokyo".to_string(),
                postal_code: "105-0011".to_string(),
                iso_country: "JP".to_string(),
            },
        },
        person: PersonProfile {
            first_name: "Taro".to_string(),
            last_name: "Yamada".to_string(),
            birth_date: "1985-04-12".to_string(),
            address: PostalAddress {
                street: "4-5-6 Ebisu".to_string(),
                city: "Shibuya-ku".to_string(),
                region: "Tokyo".to_string(),
                postal_code: "150-0013".to_string(),
                iso_country: "JP".to_string(),
            },
        },
        documents: DocumentConfig {
            directory: documents_dir.to_path_buf(),
            corporate_registry: "registry.pdf".to_string(),
            power_of_attorney: power_of_attorney.map(String::from),
            drivers_license: "license.jpg".to_string(),
        },
        endpoints: EndpointConfig::default(),
        telemetry: TelemetryConfig {
            log_level: "info".to_string(),
        },
    }
}

pub(super) fn write_document(dir: &Path, name: &str) {
    fs::write(dir.join(name), b"fixture-bytes").expect("write fixture document");
}

pub(super) fn write_all_documents(dir: &Path) {
    write_document(dir, "registry.pdf");
    write_document(dir, "poa.pdf");
    write_document(dir, "license.jpg");
}

pub(super) fn subaccount(n: u32) -> SubAccount {
    SubAccount {
        sid: AccountSid(format!("AC{n}")),
        friendly_name: format!("Tenant {n}"),
        auth_token: format!("token-{n}"),
    }
}

pub(super) fn bundle(sid: &str, status: BundleStatus) -> BundleSummary {
    BundleSummary {
        sid: BundleSid(sid.to_string()),
        status,
        friendly_name: "Acme Telephony KK".to_string(),
    }
}

/// Walker pinned to a fixed timestamp so friendly names are deterministic.
pub(super) fn walker(
    gateway: Arc<FakeGateway>,
    config: ProvisionerConfig,
) -> AccountWalker<FakeGateway> {
    let started_at = chrono::Local
        .with_ymd_and_hms(2025, 7, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp");
    AccountWalker::with_started_at(gateway, config, started_at)
}

pub(super) fn run_label() -> String {
    chrono::Local
        .with_ymd_and_hms(2025, 7, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
        .to_rfc2822()
}
