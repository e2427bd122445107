use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Method, Response, StatusCode};
use secrecy::{ExposeSecret as _, SecretString};
use url::Url;

use super::types::{CreateTicket, OutgoingMessage};
use crate::error::Error;
use crate::types::Category;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

const CREATE_TICKET_PATH: &str = "/bot/ticket";
const CATEGORIES_PATH: &str = "/bot/categories";
const SEND_MESSAGE_PATH: &str = "/ticket/message";

/// Authenticated HTTP client for the iocket REST API.
///
/// The bot token rides on every request as `Authorization: Bot <token>`.
pub struct Client {
    http: reqwest::Client,
    host: Url,
}

impl Client {
    pub(crate) fn new(token: &str, host: &str) -> crate::Result<Self> {
        let token = SecretString::from(format!("Bot {token}"));
        let mut auth = HeaderValue::from_str(token.expose_secret())?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            host: Url::parse(host)?,
        })
    }

    /// `POST /bot/ticket`. The server answers 200 or 201 depending on whether
    /// an equivalent ticket already existed; both count as success.
    pub(crate) async fn create_ticket(&self, ticket: &CreateTicket) -> crate::Result<()> {
        let response = self
            .http
            .post(self.endpoint(CREATE_TICKET_PATH)?)
            .json(ticket)
            .send()
            .await?;

        Self::accept(
            response,
            Method::POST,
            CREATE_TICKET_PATH,
            &[StatusCode::OK, StatusCode::CREATED],
        )
        .await?;
        Ok(())
    }

    /// `GET /bot/categories`.
    pub(crate) async fn categories(&self) -> crate::Result<Vec<Category>> {
        let response = self
            .http
            .get(self.endpoint(CATEGORIES_PATH)?)
            .send()
            .await?;

        let response =
            Self::accept(response, Method::GET, CATEGORIES_PATH, &[StatusCode::OK]).await?;
        Ok(response.json().await?)
    }

    /// `POST /ticket/message`.
    pub(crate) async fn send_message(&self, message: &OutgoingMessage) -> crate::Result<()> {
        let response = self
            .http
            .post(self.endpoint(SEND_MESSAGE_PATH)?)
            .json(message)
            .send()
            .await?;

        Self::accept(
            response,
            Method::POST,
            SEND_MESSAGE_PATH,
            &[StatusCode::CREATED],
        )
        .await?;
        Ok(())
    }

    fn endpoint(&self, path: &str) -> crate::Result<Url> {
        Ok(self.host.join(path)?)
    }

    /// Map any non-accepted status to a status error carrying the raw body.
    async fn accept(
        response: Response,
        method: Method,
        path: &str,
        accepted: &[StatusCode],
    ) -> crate::Result<Response> {
        let status = response.status();
        if accepted.contains(&status) {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!(%status, %method, path, "REST call failed");
        Err(Error::status(status, method, path.to_owned(), body))
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("host", &self.host.as_str())
            .finish_non_exhaustive()
    }
}
