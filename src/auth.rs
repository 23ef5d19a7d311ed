use base64::engine::{general_purpose, Engine};

/// Authentication utilities for the CRM API.
pub struct CrmAuth;

impl CrmAuth {
    /// Build the HTTP Basic authorization header value for an API key.
    /// The CRM expects the key as the username with an empty password.
    pub fn basic_header(api_key: &str) -> String {
        let encoded = general_purpose::STANDARD.encode(format!("{}:", api_key));
        format!("Basic {}", encoded)
    }
}
