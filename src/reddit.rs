//! Minimal Reddit OAuth client for a script-type app.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use reqwest::{Client, Response};
use serde::{Deserialize, de::DeserializeOwned};
use url::Url;

use crate::bot::Platform;
use crate::config::RedditConfig;
use crate::error::{BotError, Result};
use crate::types::{InboxItem, ItemKind};

const TOKEN_PATH: &str = "api/v1/access_token";
const ME_PATH: &str = "api/v1/me";
const UNREAD_PATH: &str = "message/unread";
const COMMENT_PATH: &str = "api/comment";
const READ_MESSAGE_PATH: &str = "api/read_message";

// Largest page size the listing endpoints accept
const UNREAD_PAGE_LIMIT: usize = 100;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Identity {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<Thing>,
    after: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Thing {
    kind: String,
    data: MessageData,
}

#[derive(Debug, Deserialize)]
struct MessageData {
    name: String,
    author: Option<String>,
    #[serde(default)]
    body: String,
    #[serde(default)]
    was_comment: bool,
}

#[derive(Debug, Deserialize)]
struct CommentResponse {
    json: CommentJson,
}

#[derive(Debug, Deserialize)]
struct CommentJson {
    #[serde(default)]
    errors: Vec<serde_json::Value>,
}

impl Thing {
    // Comment replies and username mentions are both `t1`; private messages are `t4`.
    fn into_item(self) -> InboxItem {
        let kind = if self.data.was_comment || self.kind == "t1" {
            ItemKind::CommentReply
        } else {
            ItemKind::DirectMessage
        };
        InboxItem {
            id: self.data.name,
            kind,
            author: self.data.author,
            body: self.data.body,
        }
    }
}

pub struct RedditClient {
    client: Client,
    api_url: Url,
    access_token: String,
}

impl RedditClient {
    /// Authenticate with the password grant and return a ready session.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::RedditAuth`] if Reddit rejects the credentials.
    pub async fn login(config: &RedditConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let token_url = base_url(&config.auth_url)?.join(TOKEN_PATH)?;
        debug!("Requesting access token from {token_url}");

        let response = client
            .post(token_url)
            .basic_auth(&config.client_id, Some(&config.client_secret))
            .form(&[
                ("grant_type", "password"),
                ("username", config.username.as_str()),
                ("password", config.password.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|e| format!("Failed to read error response: {e}"));
            return Err(BotError::RedditAuth(format!("{status}: {message}")));
        }

        let token: TokenResponse = response.json().await?;
        if let Some(error) = token.error {
            return Err(BotError::RedditAuth(error));
        }
        let access_token = token
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| BotError::RedditAuth("No access token in response".to_string()))?;

        info!("Authenticated with Reddit as {}", config.username);

        Ok(Self {
            client,
            api_url: base_url(&config.api_url)?,
            access_token,
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let response = self
            .client
            .get(self.api_url.join(path)?)
            .bearer_auth(&self.access_token)
            .query(query)
            .send()
            .await?;

        Ok(check_status(response).await?.json().await?)
    }

    async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Result<Response> {
        let response = self
            .client
            .post(self.api_url.join(path)?)
            .bearer_auth(&self.access_token)
            .form(form)
            .send()
            .await?;

        check_status(response).await
    }
}

#[async_trait]
impl Platform for RedditClient {
    async fn me(&self) -> Result<String> {
        let identity: Identity = self.get(ME_PATH, &[]).await?;
        Ok(identity.name)
    }

    async fn unread(&self) -> Result<Vec<InboxItem>> {
        let mut items = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let mut query = vec![
                ("limit", UNREAD_PAGE_LIMIT.to_string()),
                ("count", items.len().to_string()),
                ("mark", "false".to_string()),
            ];
            if let Some(after) = &after {
                query.push(("after", after.clone()));
            }

            let listing: Listing = self.get(UNREAD_PATH, &query).await?;
            debug!(
                "Fetched {} unread items (after={after:?})",
                listing.data.children.len()
            );
            items.extend(listing.data.children.into_iter().map(Thing::into_item));

            match listing.data.after {
                Some(next) if !next.is_empty() && after.as_deref() != Some(next.as_str()) => {
                    after = Some(next);
                }
                _ => break,
            }
        }

        Ok(items)
    }

    async fn reply(&self, item: &InboxItem, text: &str) -> Result<()> {
        let response = self
            .post_form(
                COMMENT_PATH,
                &[("thing_id", item.id.as_str()), ("text", text), ("api_type", "json")],
            )
            .await?;

        let body: CommentResponse = response.json().await?;
        if body.json.errors.is_empty() {
            Ok(())
        } else {
            let errors = body
                .json
                .errors
                .iter()
                .map(serde_json::Value::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            Err(BotError::RedditResponse(errors))
        }
    }

    async fn mark_read(&self, item: &InboxItem) -> Result<()> {
        self.post_form(READ_MESSAGE_PATH, &[("id", item.id.as_str())])
            .await?;
        Ok(())
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .text()
        .await
        .unwrap_or_else(|e| format!("Failed to read error response: {e}"));
    Err(BotError::RedditApi { status, message })
}

/// Parse a base URL so that relative endpoint paths join beneath it.
fn base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
