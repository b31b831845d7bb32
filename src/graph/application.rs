//! Application registration operations against the directory.

use crate::error::Result;
use crate::graph::GraphClient;
use crate::permissions::{self, RequiredResourceAccess};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use url::Url;

const ADMIN_CONSENT_AUTHORITY: &str = "https://login.microsoftonline.com";

/// Accounts in any organizational directory and personal Microsoft accounts
const SIGN_IN_AUDIENCE: &str = "AzureADandPersonalMicrosoftAccount";

/// A freshly created application object
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedApplication {
    /// Application (client) ID, used by the downstream integration
    pub app_id: String,
    /// Directory object ID, used to address the application in later calls
    #[serde(rename = "id")]
    pub object_id: String,
    pub display_name: String,
}

/// The secret returned by `addPassword`; shown exactly once
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordCredential {
    pub secret_text: String,
    #[serde(default)]
    pub end_date_time: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewApplication<'a> {
    display_name: &'a str,
    sign_in_audience: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PermissionPatch {
    required_resource_access: Vec<RequiredResourceAccess>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddPasswordRequest<'a> {
    password_credential: NewPasswordCredential<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewPasswordCredential<'a> {
    display_name: &'a str,
}

/// Executes the directory mutations of the provisioning flow, in order
pub struct AppRegistrar<'a> {
    client: &'a GraphClient,
}

impl<'a> AppRegistrar<'a> {
    pub fn new(client: &'a GraphClient) -> Self {
        Self { client }
    }

    /// Create the application object. Success is exactly HTTP 201.
    pub async fn create_application(&self, display_name: &str) -> Result<CreatedApplication> {
        let body = NewApplication {
            display_name,
            sign_in_audience: SIGN_IN_AUDIENCE,
        };

        self.client
            .post_json("/applications", &body, StatusCode::CREATED)
            .await
    }

    /// Patch the static permission table onto the application.
    /// Success is exactly HTTP 204.
    pub async fn grant_permissions(&self, object_id: &str) -> Result<()> {
        let body = PermissionPatch {
            required_resource_access: permissions::required_resource_access(),
        };

        self.client
            .patch_expect(
                &format!("/applications/{}", object_id),
                &body,
                StatusCode::NO_CONTENT,
            )
            .await
    }

    /// Mint a client secret on the application. Success is exactly HTTP 200.
    pub async fn add_client_secret(
        &self,
        object_id: &str,
        display_name: &str,
    ) -> Result<PasswordCredential> {
        let body = AddPasswordRequest {
            password_credential: NewPasswordCredential { display_name },
        };

        self.client
            .post_json(
                &format!("/applications/{}/addPassword", object_id),
                &body,
                StatusCode::OK,
            )
            .await
    }
}

/// The provider-hosted page where a tenant administrator approves the
/// requested application permissions
pub fn admin_consent_url(tenant_id: &str, app_id: &str) -> Result<Url> {
    let mut url = Url::parse(&format!(
        "{}/{}/adminconsent",
        ADMIN_CONSENT_AUTHORITY, tenant_id
    ))?;
    url.query_pairs_mut().append_pair("client_id", app_id);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_consent_url_contains_tenant_and_client() {
        let url = admin_consent_url("11111111-2222-3333-4444-555555555555", "my-app-id").unwrap();

        assert_eq!(url.host_str(), Some("login.microsoftonline.com"));
        assert_eq!(
            url.path(),
            "/11111111-2222-3333-4444-555555555555/adminconsent"
        );
        assert!(url
            .query_pairs()
            .any(|(k, v)| k == "client_id" && v == "my-app-id"));
    }

    #[test]
    fn test_admin_consent_url_escapes_query_value() {
        let url = admin_consent_url("contoso.onmicrosoft.com", "a b&c").unwrap();
        assert!(url.as_str().contains("client_id=a+b%26c"));
    }
}
