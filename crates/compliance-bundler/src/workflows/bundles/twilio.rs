//! REST implementation of the compliance gateway.
//!
//! Record creation goes through the vendor's form-encoded JSON API; document
//! uploads go through the dedicated multipart endpoint because the regular
//! API does not accept binary payloads for supporting documents. Every call
//! is basic-authenticated with the acting account's SID and token.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::domain::{
    AccountCredentials, AccountSid, AddressRequest, AddressSid, BundleRequest, BundleSid,
    BundleStatus, BundleSummary, DocumentSid, DocumentUpload, EndUserRequest, EndUserSid,
    ItemAssignmentSid, SubAccount,
};
use super::gateway::{ComplianceGateway, GatewayError};
use crate::config::EndpointConfig;

const API_VERSION: &str = "2010-04-01";
const REGULATORY_PATH: &str = "v2/RegulatoryCompliance";
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
const ERROR_BODY_LIMIT: usize = 200;

pub struct TwilioClient {
    http: Client,
    endpoints: EndpointConfig,
}

impl TwilioClient {
    pub fn new(endpoints: EndpointConfig) -> Result<Self, GatewayError> {
        let http = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|err| GatewayError::Transport(err.to_string()))?;

        Ok(Self { http, endpoints })
    }

    fn accounts_url(&self, limit: usize) -> String {
        format!(
            "{}/{}/Accounts.json?PageSize={}",
            self.endpoints.api_base, API_VERSION, limit
        )
    }

    fn addresses_url(&self, account: &AccountSid) -> String {
        format!(
            "{}/{}/Accounts/{}/Addresses.json",
            self.endpoints.api_base, API_VERSION, account
        )
    }

    fn bundles_url(&self) -> String {
        format!("{}/{}/Bundles", self.endpoints.numbers_base, REGULATORY_PATH)
    }

    fn bundle_url(&self, bundle: &BundleSid) -> String {
        format!("{}/{}", self.bundles_url(), bundle)
    }

    fn end_users_url(&self) -> String {
        format!(
            "{}/{}/EndUsers",
            self.endpoints.numbers_base, REGULATORY_PATH
        )
    }

    fn item_assignments_url(&self, bundle: &BundleSid) -> String {
        format!("{}/ItemAssignments", self.bundle_url(bundle))
    }

    fn upload_url(&self) -> String {
        format!(
            "{}/{}/SupportingDocuments",
            self.endpoints.upload_base, REGULATORY_PATH
        )
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        credentials: &AccountCredentials,
        url: String,
    ) -> Result<T, GatewayError> {
        let response = self
            .http
            .get(&url)
            .basic_auth(credentials.account_sid.as_str(), Some(&credentials.auth_token))
            .send()
            .await
            .map_err(|err| GatewayError::Transport(err.to_string()))?;

        decode(response).await
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        credentials: &AccountCredentials,
        url: String,
        fields: Vec<(&'static str, String)>,
    ) -> Result<T, GatewayError> {
        let response = self
            .http
            .post(&url)
            .basic_auth(credentials.account_sid.as_str(), Some(&credentials.auth_token))
            .form(&fields)
            .send()
            .await
            .map_err(|err| GatewayError::Transport(err.to_string()))?;

        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, GatewayError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|err| GatewayError::Transport(err.to_string()))?;

    if !status.is_success() {
        return Err(GatewayError::Api {
            status: status.as_u16(),
            body: body.chars().take(ERROR_BODY_LIMIT).collect(),
        });
    }

    serde_json::from_str(&body).map_err(|err| GatewayError::Payload(err.to_string()))
}

fn address_fields(request: &AddressRequest) -> Vec<(&'static str, String)> {
    vec![
        ("CustomerName", request.customer_name.clone()),
        ("FriendlyName", request.friendly_name.clone()),
        ("Street", request.street.clone()),
        ("City", request.city.clone()),
        ("Region", request.region.clone()),
        ("PostalCode", request.postal_code.clone()),
        ("IsoCountry", request.iso_country.clone()),
    ]
}

fn bundle_fields(request: &BundleRequest) -> Vec<(&'static str, String)> {
    vec![
        ("EndUserType", request.end_user_type.clone()),
        ("IsoCountry", request.iso_country.clone()),
        ("NumberType", request.number_type.clone()),
        ("FriendlyName", request.friendly_name.clone()),
        ("Email", request.email.clone()),
    ]
}

fn end_user_fields(request: &EndUserRequest) -> Vec<(&'static str, String)> {
    vec![
        ("Type", request.end_user_type.clone()),
        ("FriendlyName", request.friendly_name.clone()),
        ("Attributes", request.attributes.to_string()),
    ]
}

#[derive(Debug, Deserialize)]
struct AccountsPage {
    accounts: Vec<AccountResource>,
}

#[derive(Debug, Deserialize)]
struct AccountResource {
    sid: String,
    friendly_name: String,
    auth_token: String,
}

#[derive(Debug, Deserialize)]
struct BundlesPage {
    results: Vec<BundleResource>,
}

#[derive(Debug, Deserialize)]
struct BundleResource {
    sid: String,
    status: BundleStatus,
    friendly_name: String,
}

#[derive(Debug, Deserialize)]
struct SidResource {
    sid: String,
}

#[async_trait]
impl ComplianceGateway for TwilioClient {
    async fn list_subaccounts(
        &self,
        credentials: &AccountCredentials,
        limit: usize,
    ) -> Result<Vec<SubAccount>, GatewayError> {
        let page: AccountsPage = self
            .get_json(credentials, self.accounts_url(limit))
            .await?;

        Ok(page
            .accounts
            .into_iter()
            .map(|account| SubAccount {
                sid: AccountSid(account.sid),
                friendly_name: account.friendly_name,
                auth_token: account.auth_token,
            })
            .collect())
    }

    async fn list_bundles(
        &self,
        credentials: &AccountCredentials,
        limit: usize,
    ) -> Result<Vec<BundleSummary>, GatewayError> {
        let url = format!("{}?PageSize={}", self.bundles_url(), limit);
        let page: BundlesPage = self.get_json(credentials, url).await?;

        Ok(page
            .results
            .into_iter()
            .map(|bundle| BundleSummary {
                sid: BundleSid(bundle.sid),
                status: bundle.status,
                friendly_name: bundle.friendly_name,
            })
            .collect())
    }

    async fn create_address(
        &self,
        credentials: &AccountCredentials,
        request: AddressRequest,
    ) -> Result<AddressSid, GatewayError> {
        let url = self.addresses_url(&credentials.account_sid);
        let created: SidResource = self
            .post_form(credentials, url, address_fields(&request))
            .await?;
        Ok(AddressSid(created.sid))
    }

    async fn create_bundle(
        &self,
        credentials: &AccountCredentials,
        request: BundleRequest,
    ) -> Result<BundleSid, GatewayError> {
        let created: SidResource = self
            .post_form(credentials, self.bundles_url(), bundle_fields(&request))
            .await?;
        Ok(BundleSid(created.sid))
    }

    async fn create_end_user(
        &self,
        credentials: &AccountCredentials,
        request: EndUserRequest,
    ) -> Result<EndUserSid, GatewayError> {
        let created: SidResource = self
            .post_form(credentials, self.end_users_url(), end_user_fields(&request))
            .await?;
        Ok(EndUserSid(created.sid))
    }

    async fn upload_document(
        &self,
        credentials: &AccountCredentials,
        upload: DocumentUpload,
    ) -> Result<DocumentSid, GatewayError> {
        let mime = upload.kind.mime_type();
        let part = Part::bytes(upload.file.bytes)
            .file_name(upload.file.file_name)
            .mime_str(mime.as_ref())
            .map_err(|err| GatewayError::Transport(err.to_string()))?;

        let form = Form::new()
            .text("Type", upload.kind.label())
            .text("MimeType", mime.to_string())
            .text("Attributes", upload.attributes.to_string())
            .text("FriendlyName", upload.friendly_name)
            .part("File", part);

        let response = self
            .http
            .post(self.upload_url())
            .basic_auth(credentials.account_sid.as_str(), Some(&credentials.auth_token))
            .multipart(form)
            .send()
            .await
            .map_err(|err| GatewayError::Transport(err.to_string()))?;

        let created: SidResource = decode(response).await?;
        Ok(DocumentSid(created.sid))
    }

    async fn assign_item(
        &self,
        credentials: &AccountCredentials,
        bundle: &BundleSid,
        object_sid: &str,
    ) -> Result<ItemAssignmentSid, GatewayError> {
        let fields = vec![("ObjectSid", object_sid.to_string())];
        let created: SidResource = self
            .post_form(credentials, self.item_assignments_url(bundle), fields)
            .await?;
        Ok(ItemAssignmentSid(created.sid))
    }

    async fn update_bundle(
        &self,
        credentials: &AccountCredentials,
        bundle: &BundleSid,
        friendly_name: &str,
        status: BundleStatus,
    ) -> Result<(), GatewayError> {
        let fields = vec![
            ("FriendlyName", friendly_name.to_string()),
            ("Status", status.label().to_string()),
        ];
        let _updated: SidResource = self
            .post_form(credentials, self.bundle_url(bundle), fields)
            .await?;
        Ok(())
    }
}
