use gham_client::Request;
use http::HeaderMap;
use http::HeaderValue;

/// Provides the bearer credential attached to upstream requests.
///
/// Returning `None` sends the request unauthenticated, which GitHub accepts
/// with a much lower rate limit.
pub trait AuthProvider: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

#[derive(Clone, Debug, Default)]
pub struct BearerAuth {
    token: Option<String>,
}

impl BearerAuth {
    pub fn new(token: Option<String>) -> Self {
        let token = token.filter(|token| !token.trim().is_empty());
        Self { token }
    }
}

impl AuthProvider for BearerAuth {
    fn bearer_token(&self) -> Option<String> {
        self.token.clone()
    }
}

pub(crate) fn add_auth_headers_to_header_map<A: AuthProvider>(auth: &A, headers: &mut HeaderMap) {
    if let Some(token) = auth.bearer_token()
        && let Ok(header) = HeaderValue::from_str(&format!("Bearer {token}"))
    {
        let _ = headers.insert(http::header::AUTHORIZATION, header);
    }
}

pub(crate) fn add_auth_headers<A: AuthProvider>(auth: &A, mut req: Request) -> Request {
    add_auth_headers_to_header_map(auth, &mut req.headers);
    req
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn blank_token_is_treated_as_absent() {
        let auth = BearerAuth::new(Some("  ".to_string()));
        let mut headers = HeaderMap::new();
        add_auth_headers_to_header_map(&auth, &mut headers);
        assert!(headers.get(http::header::AUTHORIZATION).is_none());
    }

    #[test]
    fn token_is_sent_as_bearer() {
        let auth = BearerAuth::new(Some("ghp_secret".to_string()));
        let mut headers = HeaderMap::new();
        add_auth_headers_to_header_map(&auth, &mut headers);
        assert_eq!(
            headers
                .get(http::header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok()),
            Some("Bearer ghp_secret")
        );
    }
}
