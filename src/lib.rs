pub mod bot;
pub mod config;
pub mod error;
pub mod faq;
pub mod keyword;
pub mod reddit;
pub mod response;
pub mod types;

use std::path::PathBuf;

use log::{debug, info};

use bot::RunSummary;
use config::{Config, ContentConfig};
use error::Result;
use keyword::KeywordExtractor;
use reddit::RedditClient;
use response::ResponseComposer;

/// Authenticate with Reddit and answer every unread trigger once.
///
/// # Errors
///
/// Returns an error if configuration is invalid, authentication fails or the
/// inbox cannot be read.
pub async fn run(content_dir: Option<PathBuf>) -> Result<RunSummary> {
    info!("Initializing bot");
    let mut config = Config::from_env()?;
    if let Some(dir) = content_dir {
        config.content.content_dir = dir;
    }

    let extractor = KeywordExtractor::new(&config.mention)?;
    let composer = ResponseComposer::from_config(&config.content);

    debug!("Logging in to Reddit");
    let client = RedditClient::login(&config.reddit).await?;

    bot::run_once(&client, &extractor, &composer, config.pacing).await
}

/// Compose the reply for `keyword` from local files only. Needs no credentials.
///
/// # Errors
///
/// Returns an error if the content settings are malformed.
pub fn preview(keyword: &str, content_dir: Option<PathBuf>) -> Result<String> {
    let mut content = ContentConfig::from_env()?;
    if let Some(dir) = content_dir {
        content.content_dir = dir;
    }
    Ok(ResponseComposer::from_config(&content).compose(keyword))
}
