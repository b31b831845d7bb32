//! Integration tests for the Graph provisioning steps
//!
//! Uses wiremock to simulate directory responses and verify that each step
//! accepts exactly its success status code, that errors carry the response
//! body, and that a failed step stops the pipeline.

use defender365_setup::graph::application::AppRegistrar;
use defender365_setup::graph::GraphClient;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Test helper to create a mock server
async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

fn test_client(server: &MockServer) -> GraphClient {
    GraphClient::with_base_url(server.uri(), "test-token".to_string())
}

/// Application creation succeeds on 201 and returns the directory identifiers
#[tokio::test]
async fn test_create_application_success() {
    let server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/applications"))
        .and(header("Authorization", "Bearer test-token"))
        .and(body_partial_json(serde_json::json!({
            "displayName": "datadog-ms-defender-365",
            "signInAudience": "AzureADandPersonalMicrosoftAccount"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "appId": "client-id-123",
            "id": "object-id-456",
            "displayName": "datadog-ms-defender-365"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let registrar = AppRegistrar::new(&client);

    let app = registrar
        .create_application("datadog-ms-defender-365")
        .await
        .unwrap();

    assert_eq!(app.app_id, "client-id-123");
    assert_eq!(app.object_id, "object-id-456");
    assert_eq!(app.display_name, "datadog-ms-defender-365");
}

/// 200 OK is the wrong success code for creation and must be rejected
#[tokio::test]
async fn test_create_application_rejects_other_success_codes() {
    let server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/applications"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "appId": "client-id-123",
            "id": "object-id-456",
            "displayName": "app"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let registrar = AppRegistrar::new(&client);

    let result = registrar.create_application("app").await;
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("200"));
}

/// Error responses surface the status and the Graph error body
#[tokio::test]
async fn test_create_application_error_carries_body() {
    let server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/applications"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "error": {
                "code": "Authorization_RequestDenied",
                "message": "Insufficient privileges to complete the operation."
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let registrar = AppRegistrar::new(&client);

    let err = registrar.create_application("app").await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("403"));
    assert!(message.contains("Authorization_RequestDenied"));
    assert!(message.contains("Insufficient privileges"));
}

/// Permission assignment succeeds only on 204 and sends the static table
#[tokio::test]
async fn test_grant_permissions_success() {
    let server = setup_mock_server().await;

    Mock::given(method("PATCH"))
        .and(path("/applications/object-id-456"))
        .and(header("Authorization", "Bearer test-token"))
        .and(body_partial_json(serde_json::json!({
            "requiredResourceAccess": [
                {"resourceAppId": "00000003-0000-0000-c000-000000000000"},
                {"resourceAppId": "fc780465-2017-40d4-a0c5-307022471b92"}
            ]
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let registrar = AppRegistrar::new(&client);

    registrar.grant_permissions("object-id-456").await.unwrap();
}

/// A 200 on the permission patch is not the expected 204
#[tokio::test]
async fn test_grant_permissions_rejects_200() {
    let server = setup_mock_server().await;

    Mock::given(method("PATCH"))
        .and(path("/applications/object-id-456"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let registrar = AppRegistrar::new(&client);

    assert!(registrar.grant_permissions("object-id-456").await.is_err());
}

/// Secret generation succeeds on 200 and returns the secret text
#[tokio::test]
async fn test_add_client_secret_success() {
    let server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/applications/object-id-456/addPassword"))
        .and(body_partial_json(serde_json::json!({
            "passwordCredential": {"displayName": "defender365"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "secretText": "s3cr3t-value",
            "endDateTime": "2027-08-29T00:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let registrar = AppRegistrar::new(&client);

    let secret = registrar
        .add_client_secret("object-id-456", "defender365")
        .await
        .unwrap();

    assert_eq!(secret.secret_text, "s3cr3t-value");
    assert!(secret.end_date_time.is_some());
}

/// 201 is the wrong success code for addPassword
#[tokio::test]
async fn test_add_client_secret_rejects_201() {
    let server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/applications/object-id-456/addPassword"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "secretText": "s3cr3t-value"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let registrar = AppRegistrar::new(&client);

    assert!(registrar
        .add_client_secret("object-id-456", "defender365")
        .await
        .is_err());
}

/// A failed creation stops the pipeline: the permission patch never fires
#[tokio::test]
async fn test_failed_step_short_circuits_pipeline() {
    let server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/applications"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": {"code": "BadRequest", "message": "Property displayName is required."}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let registrar = AppRegistrar::new(&client);

    let result = async {
        let app = registrar.create_application("").await?;
        registrar.grant_permissions(&app.object_id).await?;
        Ok::<_, defender365_setup::error::SetupError>(app)
    }
    .await;

    assert!(result.is_err());
    // MockServer verifies the expect(0) on drop
}
