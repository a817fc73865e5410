//! HTTP digest authentication for the management APIs
//!
//! Both Ops Manager and Atlas answer an unauthenticated request with a `401`
//! and a `WWW-Authenticate: Digest ...` challenge. The client replays the
//! request once with the header produced here.

use digest_auth::AuthContext;
use reqwest::Method;

use crate::error::{MigrationError, Result};

/// Username (public key) and API key (private key) for one deployment
#[derive(Clone)]
pub struct DigestCredentials {
    username: String,
    api_key: String,
}

impl DigestCredentials {
    pub fn new(username: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            api_key: api_key.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Answer a digest challenge for `method` on `uri` (path and query only)
    pub fn authorization(&self, challenge: &str, method: &Method, uri: &str, body: Option<&[u8]>) -> Result<String> {
        let mut prompt = digest_auth::parse(challenge)
            .map_err(|e| MigrationError::Auth(format!("unparseable challenge '{}': {}", challenge, e)))?;

        let context = if *method == Method::POST {
            AuthContext::new_post(self.username.as_str(), self.api_key.as_str(), uri, body)
        } else {
            AuthContext::new(self.username.as_str(), self.api_key.as_str(), uri)
        };

        let answer = prompt
            .respond(&context)
            .map_err(|e| MigrationError::Auth(format!("cannot answer challenge for {}: {}", uri, e)))?;

        Ok(answer.to_header_string())
    }
}

impl std::fmt::Debug for DigestCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DigestCredentials")
            .field("username", &self.username)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Path and query of `url`, the form digest expects in `uri=`
pub fn request_uri(url: &str) -> Result<String> {
    let parsed = reqwest::Url::parse(url).map_err(|e| MigrationError::Config(format!("invalid URL '{}': {}", url, e)))?;
    Ok(match parsed.query() {
        Some(query) => format!("{}?{}", parsed.path(), query),
        None => parsed.path().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHALLENGE: &str =
        r#"Digest realm="MMS Public API", domain="", nonce="OSNBHp4lEZQ0jMSFbKOLDWpVDCdrqPvx", algorithm=MD5, qop="auth", stale=false"#;

    #[test]
    fn test_answers_digest_challenge() {
        let credentials = DigestCredentials::new("ops-user", "0000-1111");
        let header = credentials
            .authorization(CHALLENGE, &Method::GET, "/api/public/v1.0/groups", None)
            .unwrap();

        assert!(header.starts_with("Digest "));
        assert!(header.contains(r#"username="ops-user""#));
        assert!(header.contains(r#"uri="/api/public/v1.0/groups""#));
        assert!(!header.contains("0000-1111"));
    }

    #[test]
    fn test_post_challenge() {
        let credentials = DigestCredentials::new("ops-user", "0000-1111");
        let header = credentials
            .authorization(CHALLENGE, &Method::POST, "/api/atlas/v2/groups/p1/databaseUsers", Some(b"{}"))
            .unwrap();
        assert!(header.contains(r#"uri="/api/atlas/v2/groups/p1/databaseUsers""#));
    }

    #[test]
    fn test_rejects_non_digest_challenge() {
        let credentials = DigestCredentials::new("ops-user", "0000-1111");
        let result = credentials.authorization(r#"Basic realm="x""#, &Method::GET, "/", None);
        assert!(matches!(result, Err(MigrationError::Auth(_))));
    }

    #[test]
    fn test_request_uri() {
        assert_eq!(
            request_uri("https://om.example.com/api/public/v1.0/groups?pageNum=1&itemsPerPage=500").unwrap(),
            "/api/public/v1.0/groups?pageNum=1&itemsPerPage=500"
        );
        assert_eq!(request_uri("https://om.example.com/api/public/v1.0/groups").unwrap(), "/api/public/v1.0/groups");
        assert!(request_uri("not a url").is_err());
    }

    #[test]
    fn test_debug_hides_api_key() {
        let rendered = format!("{:?}", DigestCredentials::new("ops-user", "0000-1111"));
        assert!(!rendered.contains("0000-1111"));
    }
}
