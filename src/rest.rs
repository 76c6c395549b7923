use crate::error::{ApiError, Error, Result};
use crate::session::Session;
use reqwest::header::{ACCEPT, ACCEPT_ENCODING, AUTHORIZATION};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, error, warn};
use url::Url;

/// Path of the token refresh endpoint, relative to the session base URL
pub(crate) const REFRESH_PATH: &str = "/saop-rest-data/v1/apptoken-refresh";

/// Query parameters controlling a listing
#[derive(Debug, Clone, Default)]
pub struct ListParameters {
    /// Absolute record offset the listing starts at
    pub start_offset: i64,
    /// Records per page; 0 leaves the server default in place
    pub page_size: i32,
    /// Sort expression, empty for server order
    pub sort: String,
}

impl ListParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the absolute offset the listing starts at
    pub fn with_start_offset(mut self, offset: i64) -> Self {
        self.start_offset = offset;
        self
    }

    /// Set the page size requested from the server
    pub fn with_page_size(mut self, size: i32) -> Self {
        self.page_size = size;
        self
    }

    /// Set the sort expression
    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = sort.into();
        self
    }
}

/// Wire shape of the token refresh reply
#[derive(Debug, Deserialize)]
struct AccessTokenReply {
    #[serde(rename = "accessToken", default)]
    access_token: String,
    #[serde(rename = "validityTime", default)]
    #[allow(dead_code)]
    validity_time: i64,
}

/// Assemble the query arguments for a list call: filter pairs first, then
/// `limit` and `sort` from the list parameters, replacing filter entries
/// of the same name.
pub(crate) fn to_args(
    filter: Option<&crate::resource::Filter>,
    params: Option<&ListParameters>,
) -> Vec<(String, String)> {
    let mut args: Vec<(String, String)> = filter
        .map(|f| f.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .unwrap_or_default();

    if let Some(params) = params {
        if params.page_size != 0 {
            set_or_replace_arg(&mut args, "limit", &params.page_size.to_string());
        }
        if !params.sort.is_empty() {
            set_or_replace_arg(&mut args, "sort", &params.sort);
        }
    }

    args
}

/// Set a query argument, replacing an existing entry of the same name
pub(crate) fn set_or_replace_arg(args: &mut Vec<(String, String)>, name: &str, value: &str) {
    for arg in args.iter_mut() {
        if arg.0 == name {
            arg.1 = value.to_string();
            return;
        }
    }
    args.push((name.to_string(), value.to_string()));
}

/// Classify a reply per the API's status contract. Success passes the
/// response through so the caller can consume the body; anything else is
/// turned into the matching [`Error`] variant with the body as context.
pub(crate) async fn check_reply(response: Response) -> Result<Response> {
    let status = response.status();
    if status.as_u16() < 300 {
        return Ok(response);
    }

    if status == StatusCode::UNAUTHORIZED {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Authentication(ApiError {
            error_code: 401,
            error_description: body,
        }));
    }

    if status.as_u16() >= 400 {
        let code = status.as_u16();
        let body = response.text().await.unwrap_or_default();
        let api_error = match serde_json::from_str::<ApiError>(&body) {
            Ok(parsed) => parsed,
            Err(_) => ApiError {
                error_code: code as i32,
                error_description: body,
            },
        };
        if code == 404 {
            return Err(Error::NotFound(api_error));
        }
        return Err(Error::Server(api_error));
    }

    Err(Error::Protocol(status.as_u16()))
}

/// Send a request through the auth-and-error protocol.
///
/// `build` produces a fresh request for each attempt; the current bearer
/// token and the standing `Accept`/`Accept-Encoding` headers are added
/// here. An unauthorized reply triggers a token refresh and a replay while
/// the credential's refresh budget lasts; when the budget is spent, or the
/// refresh itself fails, the original authentication error is returned.
pub(crate) async fn execute<F>(session: &Session, build: F) -> Result<Response>
where
    F: Fn() -> RequestBuilder,
{
    let mut refreshes: u32 = 0;
    loop {
        let request = build()
            .header(AUTHORIZATION, format!("Bearer {}", session.token()))
            .header(ACCEPT, "*/*")
            .header(ACCEPT_ENCODING, "identity");

        let response = request.send().await?;
        match check_reply(response).await {
            Ok(response) => return Ok(response),
            Err(err @ Error::Authentication(_)) => {
                if refreshes >= session.auth().retries() {
                    error!("authentication failed after {} token refreshes", refreshes);
                    return Err(err);
                }
                debug!("request not authorized, refreshing access token");
                if let Err(refresh_err) = refresh_token(session).await {
                    warn!("token refresh failed: {}", refresh_err);
                    return Err(err);
                }
                refreshes += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Fetch a fresh access token with the consumer key/secret and store it in
/// the shared credentials. An empty token in the reply counts as failure.
pub(crate) async fn refresh_token(session: &Session) -> Result<()> {
    let auth = session.auth();
    let old_token = auth.token();
    let url = Url::parse(&format!("{}{}", session.url(), REFRESH_PATH))?;

    let response = session
        .client()
        .get(url)
        .query(&[
            ("consumerkey", auth.key()),
            ("consumersecret", auth.secret()),
            ("oldtoken", old_token.as_str()),
        ])
        .send()
        .await?;

    let response = check_reply(response).await?;
    let reply: AccessTokenReply = response.json().await?;
    if reply.access_token.is_empty() {
        return Err(Error::Authentication(ApiError {
            error_code: 401,
            error_description: "token refresh returned an empty token".to_string(),
        }));
    }

    auth.set_token(reply.access_token);
    debug!("access token refreshed");
    Ok(())
}
