use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::documents::DocumentFile;
use crate::config::{BusinessProfile, PersonProfile, ProvisionerConfig};

/// Identifier wrapper for an account or sub-account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountSid(pub String);

/// Identifier wrapper for an address record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AddressSid(pub String);

/// Identifier wrapper for a regulatory bundle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BundleSid(pub String);

/// Identifier wrapper for an end-user record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EndUserSid(pub String);

/// Identifier wrapper for an uploaded supporting document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentSid(pub String);

/// Identifier wrapper for a bundle item assignment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemAssignmentSid(pub String);

macro_rules! sid_display {
    ($($name:ident),+ $(,)?) => {
        $(
            impl $name {
                pub fn as_str(&self) -> &str {
                    &self.0
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }
        )+
    };
}

sid_display!(
    AccountSid,
    AddressSid,
    BundleSid,
    EndUserSid,
    DocumentSid,
    ItemAssignmentSid,
);

/// Credentials used to act as a specific account against the vendor API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountCredentials {
    pub account_sid: AccountSid,
    pub auth_token: String,
}

/// One tenant namespace under the parent account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubAccount {
    pub sid: AccountSid,
    pub friendly_name: String,
    pub auth_token: String,
}

impl SubAccount {
    pub fn credentials(&self) -> AccountCredentials {
        AccountCredentials {
            account_sid: self.sid.clone(),
            auth_token: self.auth_token.clone(),
        }
    }
}

/// Summary of an existing bundle as returned by the listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleSummary {
    pub sid: BundleSid,
    pub status: BundleStatus,
    pub friendly_name: String,
}

/// Review states a bundle moves through on the vendor side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BundleStatus {
    Draft,
    PendingReview,
    InReview,
    TwilioRejected,
    TwilioApproved,
    ProvisionallyApproved,
    /// Labels introduced server-side that this program does not know about.
    #[serde(other)]
    Unknown,
}

impl BundleStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::PendingReview => "pending-review",
            Self::InReview => "in-review",
            Self::TwilioRejected => "twilio-rejected",
            Self::TwilioApproved => "twilio-approved",
            Self::ProvisionallyApproved => "provisionally-approved",
            Self::Unknown => "unknown",
        }
    }

    /// Only a fully approved bundle makes provisioning unnecessary.
    pub const fn is_approved(self) -> bool {
        matches!(self, Self::TwilioApproved)
    }
}

impl fmt::Display for BundleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Payload for an address create call, field-for-field from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressRequest {
    pub customer_name: String,
    pub friendly_name: String,
    pub street: String,
    pub city: String,
    pub region: String,
    pub postal_code: String,
    pub iso_country: String,
}

impl AddressRequest {
    pub fn for_business(business: &BusinessProfile) -> Self {
        Self {
            customer_name: business.name.clone(),
            friendly_name: business.name.clone(),
            street: business.address.street.clone(),
            city: business.address.city.clone(),
            region: business.address.region.clone(),
            postal_code: business.address.postal_code.clone(),
            iso_country: business.address.iso_country.clone(),
        }
    }

    /// Family name leads, matching how the submission is registered.
    pub fn for_person(person: &PersonProfile) -> Self {
        let display_name = format!("{} {}", person.last_name, person.first_name);
        Self {
            customer_name: display_name.clone(),
            friendly_name: display_name,
            street: person.address.street.clone(),
            city: person.address.city.clone(),
            region: person.address.region.clone(),
            postal_code: person.address.postal_code.clone(),
            iso_country: person.address.iso_country.clone(),
        }
    }
}

/// Payload for the bundle create call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleRequest {
    pub end_user_type: String,
    pub number_type: String,
    pub iso_country: String,
    pub friendly_name: String,
    pub email: String,
}

impl BundleRequest {
    /// The bundle is registered under the individual's country while carrying
    /// the business name and contact email.
    pub fn for_submission(config: &ProvisionerConfig) -> Self {
        Self {
            end_user_type: "business".to_string(),
            number_type: config.number_type.clone(),
            iso_country: config.person.address.iso_country.clone(),
            friendly_name: config.business.name.clone(),
            email: config.business.email.clone(),
        }
    }
}

/// Payload for the end-user create call.
#[derive(Debug, Clone, PartialEq)]
pub struct EndUserRequest {
    pub end_user_type: String,
    pub friendly_name: String,
    pub attributes: Value,
}

impl EndUserRequest {
    pub fn business(business: &BusinessProfile, person: &PersonProfile, run_label: &str) -> Self {
        Self {
            end_user_type: "business".to_string(),
            friendly_name: format!("Business End User at {run_label}"),
            attributes: json!({
                "business_description": business.description,
                "business_name": business.name,
                "birth_date": person.birth_date,
                "first_name": person.first_name,
                "last_name": person.last_name,
            }),
        }
    }
}

/// The three supporting-document kinds this workflow submits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    CorporateRegistry,
    PowerOfAttorney,
    DriversLicense,
}

impl DocumentKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::CorporateRegistry => "corporate_registry",
            Self::PowerOfAttorney => "power_of_attorney",
            Self::DriversLicense => "drivers_license",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Self::CorporateRegistry => "Corporate Registry",
            Self::PowerOfAttorney => "Power Of Attorney",
            Self::DriversLicense => "Driver's License",
        }
    }

    pub fn mime_type(self) -> mime::Mime {
        match self {
            Self::CorporateRegistry | Self::PowerOfAttorney => mime::APPLICATION_PDF,
            Self::DriversLicense => mime::IMAGE_JPEG,
        }
    }
}

/// Payload for a supporting-document upload over the multipart endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentUpload {
    pub kind: DocumentKind,
    pub friendly_name: String,
    pub attributes: Value,
    pub file: DocumentFile,
}

impl DocumentUpload {
    fn new(kind: DocumentKind, attributes: Value, file: DocumentFile, run_label: &str) -> Self {
        Self {
            kind,
            friendly_name: format!("{} at {run_label}", kind.display_name()),
            attributes,
            file,
        }
    }

    pub fn corporate_registry(
        business: &BusinessProfile,
        person: &PersonProfile,
        business_address: &AddressSid,
        file: DocumentFile,
        run_label: &str,
    ) -> Self {
        let attributes = json!({
            "address_sids": [business_address.as_str()],
            "first_name": person.first_name,
            "last_name": person.last_name,
            "business_name": business.name,
            "business_description": business.description,
        });
        Self::new(DocumentKind::CorporateRegistry, attributes, file, run_label)
    }

    pub fn power_of_attorney(
        person: &PersonProfile,
        business_address: &AddressSid,
        personal_address: &AddressSid,
        file: DocumentFile,
        run_label: &str,
    ) -> Self {
        let attributes = json!({
            "address_sids": [business_address.as_str(), personal_address.as_str()],
            "first_name": person.first_name,
            "last_name": person.last_name,
        });
        Self::new(DocumentKind::PowerOfAttorney, attributes, file, run_label)
    }

    pub fn drivers_license(
        person: &PersonProfile,
        personal_address: &AddressSid,
        file: DocumentFile,
        run_label: &str,
    ) -> Self {
        let attributes = json!({
            "address_sids": [personal_address.as_str()],
            "birth_date": person.birth_date,
            "first_name": person.first_name,
            "last_name": person.last_name,
        });
        Self::new(DocumentKind::DriversLicense, attributes, file, run_label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PostalAddress;

    fn business() -> BusinessProfile {
        BusinessProfile {
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
        }
    }

    fn person() -> PersonProfile {
        PersonProfile {
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
        }
    }

    #[test]
    fn bundle_status_parses_wire_labels() {
        let status: BundleStatus =
            serde_json::from_str("\"twilio-approved\"").expect("known label");
        assert!(status.is_approved());

        let status: BundleStatus =
            serde_json::from_str("\"pending-review\"").expect("known label");
        assert_eq!(status, BundleStatus::PendingReview);
        assert!(!status.is_approved());

        let status: BundleStatus =
            serde_json::from_str("\"some-future-state\"").expect("unknown label tolerated");
        assert_eq!(status, BundleStatus::Unknown);
    }

    #[test]
    fn personal_address_leads_with_family_name() {
        let request = AddressRequest::for_person(&person());
        assert_eq!(request.customer_name, "Yamada Taro");
        assert_eq!(request.friendly_name, "Yamada Taro");
        assert_eq!(request.iso_country, "JP");
    }

    #[test]
    fn end_user_attributes_carry_identity_fields() {
        let request = EndUserRequest::business(&business(), &person(), "run-1");
        assert_eq!(request.end_user_type, "business");
        assert_eq!(request.friendly_name, "Business End User at run-1");
        assert_eq!(
            request.attributes,
            serde_json::json!({
                "business_description": "Cloud telephony reseller",
                "business_name": "Acme Telephony KK",
                "birth_date": "1985-04-12",
                "first_name": "Taro",
                "last_name": "Yamada",
            })
        );
    }

    #[test]
    fn document_attributes_reference_the_right_addresses() {
        let business_address = AddressSid("AD-business".to_string());
        let personal_address = AddressSid("AD-personal".to_string());
        let file = DocumentFile {
            file_name: "registry.pdf".to_string(),
            bytes: vec![1, 2, 3],
        };

        let registry = DocumentUpload::corporate_registry(
            &business(),
            &person(),
            &business_address,
            file.clone(),
            "run-1",
        );
        assert_eq!(registry.friendly_name, "Corporate Registry at run-1");
        assert_eq!(registry.attributes["address_sids"], serde_json::json!(["AD-business"]));
        assert_eq!(registry.attributes["business_name"], "Acme Telephony KK");

        let poa = DocumentUpload::power_of_attorney(
            &person(),
            &business_address,
            &personal_address,
            file.clone(),
            "run-1",
        );
        assert_eq!(
            poa.attributes["address_sids"],
            serde_json::json!(["AD-business", "AD-personal"])
        );
        assert!(poa.attributes.get("business_name").is_none());

        let license =
            DocumentUpload::drivers_license(&person(), &personal_address, file, "run-1");
        assert_eq!(
            license.attributes["address_sids"],
            serde_json::json!(["AD-personal"])
        );
        assert_eq!(license.attributes["birth_date"], "1985-04-12");
        assert_eq!(license.kind.mime_type(), mime::IMAGE_JPEG);
    }

    #[test]
    fn document_kinds_use_fixed_mime_types() {
        assert_eq!(
            DocumentKind::CorporateRegistry.mime_type(),
            mime::APPLICATION_PDF
        );
        assert_eq!(
            DocumentKind::PowerOfAttorney.mime_type(),
            mime::APPLICATION_PDF
        );
        assert_eq!(DocumentKind::DriversLicense.mime_type(), mime::IMAGE_JPEG);
        assert_eq!(DocumentKind::CorporateRegistry.label(), "corporate_registry");
    }
}
