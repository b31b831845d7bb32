//! Interactive browser sign-in against the tenant's identity endpoint.
//!
//! Authorization-code flow with PKCE, using the well-known Azure CLI public
//! client. A loopback listener on an ephemeral port receives the redirect and
//! hands the code back for exchange.

use crate::error::{Result, SetupError};
use oauth2::{
    basic::BasicClient, reqwest::async_http_client, AuthUrl, AuthorizationCode, ClientId,
    CsrfToken, PkceCodeChallenge, RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;

const MICROSOFT_AUTHORITY: &str = "https://login.microsoftonline.com";
const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Well-known Azure CLI application, a public client every tenant trusts for
/// interactive sign-in
const PUBLIC_CLIENT_ID: &str = "04b07795-8ddb-461a-bbee-02f9e1bf7b46";

const COMPLETION_PAGE: &str =
    "<html><body>Sign-in complete. You can close this tab and return to the terminal.</body></html>";

/// Sign the operator in via the system browser and return a bearer token
/// scoped to the Graph API default scope.
pub async fn acquire_token_interactive(tenant_id: &str) -> Result<String> {
    // The listener must be bound first so the redirect URI can carry its port
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();

    let auth_url = AuthUrl::new(format!(
        "{}/{}/oauth2/v2.0/authorize",
        MICROSOFT_AUTHORITY, tenant_id
    ))
    .map_err(|e| SetupError::Auth(format!("Invalid auth URL: {}", e)))?;

    let token_url = TokenUrl::new(format!(
        "{}/{}/oauth2/v2.0/token",
        MICROSOFT_AUTHORITY, tenant_id
    ))
    .map_err(|e| SetupError::Auth(format!("Invalid token URL: {}", e)))?;

    let redirect_url = RedirectUrl::new(format!("http://localhost:{}", port))
        .map_err(|e| SetupError::Auth(format!("Invalid redirect URL: {}", e)))?;

    let client = BasicClient::new(
        ClientId::new(PUBLIC_CLIENT_ID.to_string()),
        None,
        auth_url,
        Some(token_url),
    )
    .set_redirect_uri(redirect_url);

    let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

    let (authorize_url, csrf_state) = client
        .authorize_url(CsrfToken::new_random)
        .add_scope(Scope::new(GRAPH_SCOPE.to_string()))
        .set_pkce_challenge(pkce_challenge)
        .url();

    if open::that(authorize_url.as_str()).is_err() {
        println!("Open this URL in your browser:\n{}", authorize_url);
    }

    let (code, state) = wait_for_redirect(&listener).await?;

    if state != *csrf_state.secret() {
        return Err(SetupError::Auth(
            "State mismatch in authorization response".into(),
        ));
    }

    let token = client
        .exchange_code(AuthorizationCode::new(code))
        .set_pkce_verifier(pkce_verifier)
        .request_async(async_http_client)
        .await
        .map_err(|e| SetupError::Auth(format!("Token exchange failed: {}", e)))?;

    Ok(token.access_token().secret().clone())
}

/// Block on the browser redirect and extract the authorization code and state
async fn wait_for_redirect(listener: &TcpListener) -> Result<(String, String)> {
    let (mut stream, _) = listener.accept().await?;

    let mut buf = vec![0u8; 8192];
    let n = stream.read(&mut buf).await?;
    let request = String::from_utf8_lossy(&buf[..n]).into_owned();

    let outcome = parse_redirect_request(&request);

    // Answer the browser before surfacing any error to the operator
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        COMPLETION_PAGE.len(),
        COMPLETION_PAGE
    );
    stream.write_all(response.as_bytes()).await?;

    outcome.map_err(SetupError::Auth)
}

/// Parse the authorization redirect out of a raw HTTP request.
///
/// Returns the `code` and `state` query parameters, or the provider-reported
/// error when the sign-in was rejected.
fn parse_redirect_request(request: &str) -> std::result::Result<(String, String), String> {
    let path = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .ok_or_else(|| "Malformed redirect request".to_string())?;

    let url = Url::parse(&format!("http://localhost{}", path))
        .map_err(|e| format!("Malformed redirect URL: {}", e))?;

    let mut code = None;
    let mut state = None;
    let mut error = None;
    let mut error_description = None;

    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            "error_description" => error_description = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(error) = error {
        return Err(format!(
            "{}: {}",
            error,
            error_description.unwrap_or_else(|| "no description provided".into())
        ));
    }

    match (code, state) {
        (Some(code), Some(state)) => Ok((code, state)),
        _ => Err("Authorization response did not contain a code".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_redirect_with_code_and_state() {
        let request = "GET /?code=abc123&state=xyz789 HTTP/1.1\r\nHost: localhost\r\n\r\n";
        let (code, state) = parse_redirect_request(request).unwrap();
        assert_eq!(code, "abc123");
        assert_eq!(state, "xyz789");
    }

    #[test]
    fn test_parse_redirect_decodes_url_encoding() {
        let request = "GET /?code=a%2Bb&state=s%3D1 HTTP/1.1\r\n\r\n";
        let (code, state) = parse_redirect_request(request).unwrap();
        assert_eq!(code, "a+b");
        assert_eq!(state, "s=1");
    }

    #[test]
    fn test_parse_redirect_reports_provider_error() {
        let request = "GET /?error=access_denied&error_description=User+declined+consent HTTP/1.1\r\n\r\n";
        let err = parse_redirect_request(request).unwrap_err();
        assert!(err.contains("access_denied"));
        assert!(err.contains("User declined consent"));
    }

    #[test]
    fn test_parse_redirect_rejects_missing_code() {
        let request = "GET /favicon.ico HTTP/1.1\r\n\r\n";
        assert!(parse_redirect_request(request).is_err());
    }
}
