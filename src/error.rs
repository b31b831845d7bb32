use thiserror::Error;

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Graph API error: {0}")]
    GraphApi(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Interactive prompt error: {0}")]
    Dialoguer(#[from] dialoguer::Error),
}

pub type Result<T> = std::result::Result<T, SetupError>;

/// Parse a Graph API error response and provide helpful context
pub fn enhance_graph_error(error_response: &str) -> String {
    // Try to parse as JSON to extract error details
    if let Ok(error_json) = serde_json::from_str::<serde_json::Value>(error_response) {
        if let Some(error_obj) = error_json.get("error") {
            let code = error_obj
                .get("code")
                .and_then(|c| c.as_str())
                .unwrap_or("Unknown");
            let message = error_obj
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("No message");

            let hint = match code {
                "Unauthorized" | "InvalidAuthenticationToken" => {
                    "\nHint: The access token may have expired. Run the tool again to re-authenticate."
                }
                "Forbidden" | "Authorization_RequestDenied" | "InsufficientPrivileges" => {
                    "\nHint: The signed-in account needs permission to manage application registrations in this tenant."
                }
                "Request_BadRequest" | "BadRequest" => {
                    "\nHint: The request was rejected by the directory. Check the tenant ID and application name."
                }
                _ => "",
            };

            return format!("{}: {}{}", code, message, hint);
        }
    }

    // If we can't parse it, return the raw error
    error_response.to_string()
}
