use std::{env, path::PathBuf, time::Duration};

use log::{debug, error, info};

use crate::error::{BotError, Result};

const DEFAULT_USER_AGENT: &str =
    "Automatic response to FAQs about XEQT, for primary use in /r/justbuyxeqt";
const DEFAULT_AUTH_URL: &str = "https://www.reddit.com";
const DEFAULT_API_URL: &str = "https://oauth.reddit.com";
const DEFAULT_MENTION: &str = "xeqtbot";
const DEFAULT_PACING_SECS: u64 = 5;

/// How a keyword is turned into a document path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaqStrategy {
    /// `faq/<keyword>.md`
    Direct,
    /// Alias lookup through `triggers.md`
    Manifest,
}

impl FaqStrategy {
    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "direct" => Ok(FaqStrategy::Direct),
            "manifest" => Ok(FaqStrategy::Manifest),
            other => Err(BotError::Config(format!(
                "XEQTBOT_FAQ_STRATEGY must be 'direct' or 'manifest', got '{other}'"
            ))),
        }
    }
}

/// Settings needed to build a response. Never requires credentials.
#[derive(Debug, Clone)]
pub struct ContentConfig {
    pub content_dir: PathBuf,
    pub strategy: FaqStrategy,
    pub footer_rule: bool,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("."),
            strategy: FaqStrategy::Manifest,
            footer_rule: false,
        }
    }
}

impl ContentConfig {
    /// # Errors
    ///
    /// Returns an error if a content setting is present but malformed.
    pub fn from_env() -> Result<Self> {
        debug!("Loading content configuration from environment");
        dotenvy::dotenv().ok();

        let mut config = Self::default();
        if let Ok(dir) = env::var("XEQTBOT_CONTENT_DIR") {
            config.content_dir = PathBuf::from(dir);
        }
        if let Ok(strategy) = env::var("XEQTBOT_FAQ_STRATEGY") {
            config.strategy = FaqStrategy::parse(&strategy)?;
        }
        if let Ok(rule) = env::var("XEQTBOT_FOOTER_RULE") {
            config.footer_rule = parse_bool("XEQTBOT_FOOTER_RULE", &rule)?;
        }

        debug!("Content directory: {}", config.content_dir.display());
        debug!("FAQ strategy: {:?}", config.strategy);
        Ok(config)
    }
}

/// Reddit script-app credentials and endpoints.
#[derive(Debug, Clone)]
pub struct RedditConfig {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    pub user_agent: String,
    pub auth_url: String,
    pub api_url: String,
}

impl RedditConfig {
    /// # Errors
    ///
    /// Returns an error if any credential variable is missing.
    pub fn from_env() -> Result<Self> {
        debug!("Loading Reddit credentials from environment");
        dotenvy::dotenv().ok();

        let client_id = required("REDDIT_CLIENT_ID")?;
        let client_secret = required("REDDIT_CLIENT_SECRET")?;
        let username = required("REDDIT_USERNAME")?;
        let password = required("REDDIT_PASSWORD")?;

        let user_agent =
            env::var("REDDIT_USER_AGENT").unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string());
        let auth_url = env::var("REDDIT_AUTH_URL").unwrap_or_else(|_| DEFAULT_AUTH_URL.to_string());
        let api_url = env::var("REDDIT_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        debug!("Reddit client id length: {} characters", client_id.len());
        debug!("Reddit username: {username}");
        debug!("Reddit API base: {api_url}");

        Ok(Self {
            client_id,
            client_secret,
            username,
            password,
            user_agent,
            auth_url,
            api_url,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub reddit: RedditConfig,
    pub content: ContentConfig,
    pub mention: String,
    pub pacing: Duration,
}

impl Config {
    /// # Errors
    ///
    /// Returns an error if credentials are missing or a setting is malformed.
    pub fn from_env() -> Result<Self> {
        debug!("Loading configuration from environment");
        let reddit = RedditConfig::from_env()?;
        let content = ContentConfig::from_env()?;

        let mention = env::var("XEQTBOT_MENTION").unwrap_or_else(|_| DEFAULT_MENTION.to_string());
        if mention.trim().is_empty() {
            return Err(BotError::Config("XEQTBOT_MENTION must not be empty".to_string()));
        }

        let pacing = match env::var("XEQTBOT_PACING_SECS") {
            Ok(value) => parse_pacing(&value)?,
            Err(_) => Duration::from_secs(DEFAULT_PACING_SECS),
        };

        info!("Configuration loaded successfully");
        debug!("Mention identifier: {mention}");
        debug!("Pacing interval: {}s", pacing.as_secs());

        Ok(Self {
            reddit,
            content,
            mention,
            pacing,
        })
    }
}

fn required(key: &str) -> Result<String> {
    env::var(key).map_err(|e| {
        error!("Failed to load {key} from environment: {e}");
        BotError::from(e)
    })
}

fn parse_pacing(value: &str) -> Result<Duration> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| BotError::Config(format!("XEQTBOT_PACING_SECS '{value}': {e}")))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(BotError::Config(format!("{key} must be a boolean, got '{other}'"))),
    }
}
