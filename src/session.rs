use crate::auth::AuthInfo;
use reqwest::Client;
use std::sync::Arc;

/// Everything one unit of work needs to reach a deployment: the base URL,
/// the shared credentials, and the process-wide HTTP client. Sessions are
/// created by [`Scg::connect`](crate::Scg::connect) and handed to the unit
/// of work closure; cloning is cheap and shares the same state.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    url: String,
    auth: Arc<AuthInfo>,
    client: Client,
}

impl Session {
    pub(crate) fn new(url: &str, auth: Arc<AuthInfo>, client: Client) -> Self {
        Session {
            inner: Arc::new(SessionInner {
                url: url.trim_end_matches('/').to_string(),
                auth,
                client,
            }),
        }
    }

    /// Base URL of the deployment this session talks to, without a
    /// trailing slash
    pub fn url(&self) -> &str {
        &self.inner.url
    }

    /// The credential holder backing this session
    pub fn auth(&self) -> &Arc<AuthInfo> {
        &self.inner.auth
    }

    /// The current access token
    pub fn token(&self) -> String {
        self.inner.auth.token()
    }

    pub(crate) fn client(&self) -> &Client {
        &self.inner.client
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_trims_trailing_slash() {
        let auth = Arc::new(AuthInfo::new("k", "s", "t"));
        let session = Session::new("https://api.example.com/", auth, Client::new());
        assert_eq!(session.url(), "https://api.example.com");
    }

    #[test]
    fn test_session_token_follows_auth() {
        let auth = Arc::new(AuthInfo::new("k", "s", "old"));
        let session = Session::new("https://api.example.com", auth.clone(), Client::new());

        assert_eq!(session.token(), "old");
        auth.set_token("new");
        assert_eq!(session.token(), "new");
    }
}
