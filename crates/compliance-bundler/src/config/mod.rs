use std::env;
use std::fmt;
use std::path::PathBuf;

const DEFAULT_NUMBER_TYPE: &str = "national";
const DEFAULT_DOCUMENTS_DIR: &str = "./images";
const DEFAULT_API_BASE: &str = "https://api.twilio.com";
const DEFAULT_NUMBERS_BASE: &str = "https://numbers.twilio.com";
const DEFAULT_UPLOAD_BASE: &str = "https://numbers-upload.twilio.com";

/// Top-level configuration for one provisioning run, loaded once at startup.
#[derive(Debug, Clone)]
pub struct ProvisionerConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub number_type: String,
    pub business: BusinessProfile,
    pub person: PersonProfile,
    pub documents: DocumentConfig,
    pub endpoints: EndpointConfig,
    pub telemetry: TelemetryConfig,
}

/// Business identity submitted for verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessProfile {
    pub name: String,
    pub description: String,
    pub email: String,
    pub address: PostalAddress,
}

/// The individual named on the submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonProfile {
    pub first_name: String,
    pub last_name: String,
    pub birth_date: String,
    pub address: PostalAddress,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostalAddress {
    pub street: String,
    pub city: String,
    pub region: String,
    pub postal_code: String,
    pub iso_country: String,
}

/// Local files uploaded as supporting documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentConfig {
    pub directory: PathBuf,
    pub corporate_registry: String,
    pub power_of_attorney: Option<String>,
    pub drivers_license: String,
}

/// Vendor endpoint bases; overridable for regional deployments and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    pub api_base: String,
    pub numbers_base: String,
    pub upload_base: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            numbers_base: DEFAULT_NUMBERS_BASE.to_string(),
            upload_base: DEFAULT_UPLOAD_BASE.to_string(),
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

impl ProvisionerConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let account_sid = require("ACCOUNT_SID")?;
        let auth_token = require("AUTH_TOKEN")?;
        let number_type =
            optional("NUMBER_TYPE").unwrap_or_else(|| DEFAULT_NUMBER_TYPE.to_string());

        let business = BusinessProfile {
            name: require("BUSINESS_NAME")?,
            description: require("BUSINESS_DESCRIPTION")?,
            email: require("EMAIL")?,
            address: PostalAddress {
                street: require("BUSINESS_ADDRESS")?,
                city: require("BUSINESS_CITY")?,
                region: require("BUSINESS_REGION")?,
                postal_code: require("BUSINESS_POSTAL_CODE")?,
                iso_country: require("BUSINESS_ISO_COUNTRY")?,
            },
        };

        let person = PersonProfile {
            first_name: require("FIRST_NAME")?,
            last_name: require("LAST_NAME")?,
            birth_date: require("BIRTH_DATE")?,
            address: PostalAddress {
                street: require("STREET")?,
                city: require("CITY")?,
                region: require("REGION")?,
                postal_code: require("POSTAL_CODE")?,
                iso_country: require("ISO_COUNTRY")?,
            },
        };

        let documents = DocumentConfig {
            directory: optional("DOCUMENTS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DOCUMENTS_DIR)),
            corporate_registry: require("CORPORATE_REGISTRY_FILE")?,
            power_of_attorney: optional("POWER_OF_ATTORNEY_FILE"),
            drivers_license: require("DRIVERS_LICENSE_FILE")?,
        };

        let endpoints = EndpointConfig {
            api_base: optional("API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            numbers_base: optional("NUMBERS_BASE_URL")
                .unwrap_or_else(|| DEFAULT_NUMBERS_BASE.to_string()),
            upload_base: optional("UPLOAD_BASE_URL")
                .unwrap_or_else(|| DEFAULT_UPLOAD_BASE.to_string()),
        };

        let telemetry = TelemetryConfig {
            log_level: optional("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        };

        Ok(Self {
            account_sid,
            auth_token,
            number_type,
            business,
            person,
            documents,
            endpoints,
            telemetry,
        })
    }
}

fn require(key: &'static str) -> Result<String, ConfigError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing { key }),
    }
}

/// Empty values are treated as unset, matching the original automation's
/// handling of `POWER_OF_ATTORNEY_FILE`.
fn optional(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

#[derive(Debug)]
pub enum ConfigError {
    Missing { key: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing { key } => write!(f, "{key} must be set and non-empty"),
        }
    }
}

impl std::error::Error for ConfigError {}
