// src/config.rs
use crate::api::ClientSettings;
use crate::error::AppError;
use crate::types::{AccessToken, AdAccountId, CampaignId, PageId, ValidationError};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parsed command-line input.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineInput {
    #[command(subcommand)]
    pub command: Command,

    /// Graph API access token (page or user token)
    #[arg(long, env = "GRAPH_ACCESS_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Override the versioned Graph API root, e.g. for a local mock
    #[arg(long, env = "GRAPH_API_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Maximum number of requests in flight at once
    #[arg(long, global = true)]
    pub concurrency: Option<usize>,

    /// Enable verbose logging (debug level)
    #[arg(short, long, default_value_t = false, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List the ad accounts the token can manage
    Accounts,
    /// List the campaigns of an ad account
    Campaigns { account: String },
    /// Set a campaign to ACTIVE or PAUSED
    SetStatus { campaign: String, status: String },
    /// Show a campaign's insights over the first date window with data
    Insights { campaign: String },
    /// List recent posts of a page
    Posts {
        page: String,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// List inbox conversations of a page
    Inbox {
        page: String,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Publish a feed post on a page
    Post {
        page: String,
        #[arg(long)]
        message: String,
        #[arg(long)]
        link: Option<String>,
    },
    /// Upload a photo to a page
    UploadPhoto {
        page: String,
        file: PathBuf,
        #[arg(long)]
        caption: Option<String>,
    },
    /// Refresh the stored campaign snapshot of a page
    Sync { page: String, account: String },
}

/// A command with its IDs validated.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Accounts,
    Campaigns(AdAccountId),
    SetStatus { campaign: CampaignId, status: String },
    Insights(CampaignId),
    Posts { page: PageId, limit: Option<usize> },
    Inbox { page: PageId, limit: Option<usize> },
    Post {
        page: PageId,
        message: String,
        link: Option<String>,
    },
    UploadPhoto {
        page: PageId,
        file: PathBuf,
        caption: Option<String>,
    },
    Sync { page: PageId, account: AdAccountId },
}

impl TryFrom<Command> for Action {
    type Error = ValidationError;

    fn try_from(command: Command) -> Result<Self, Self::Error> {
        Ok(match command {
            Command::Accounts => Action::Accounts,
            Command::Campaigns { account } => Action::Campaigns(AdAccountId::parse(&account)?),
            Command::SetStatus { campaign, status } => Action::SetStatus {
                campaign: CampaignId::parse(&campaign)?,
                status,
            },
            Command::Insights { campaign } => Action::Insights(CampaignId::parse(&campaign)?),
            Command::Posts { page, limit } => Action::Posts {
                page: PageId::parse(&page)?,
                limit,
            },
            Command::Inbox { page, limit } => Action::Inbox {
                page: PageId::parse(&page)?,
                limit,
            },
            Command::Post {
                page,
                message,
                link,
            } => Action::Post {
                page: PageId::parse(&page)?,
                message,
                link,
            },
            Command::UploadPhoto {
                page,
                file,
                caption,
            } => Action::UploadPhoto {
                page: PageId::parse(&page)?,
                file,
                caption,
            },
            Command::Sync { page, account } => Action::Sync {
                page: PageId::parse(&page)?,
                account: AdAccountId::parse(&account)?,
            },
        })
    }
}

/// Resolved configuration, validated and ready to drive a command.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub token: AccessToken,
    pub settings: ClientSettings,
    pub action: Action,
    pub verbose: bool,
}

impl AppConfig {
    /// Resolves the configuration from CLI input.
    ///
    /// The token and base URL arrive either as flags or through
    /// `GRAPH_ACCESS_TOKEN` and `GRAPH_API_BASE_URL`.
    pub fn resolve(cli: CommandLineInput) -> Result<Self, AppError> {
        let raw_token = cli.token.ok_or_else(|| {
            AppError::MissingConfiguration(
                "GRAPH_ACCESS_TOKEN environment variable not set (or pass --token)".to_string(),
            )
        })?;
        let token = AccessToken::new(raw_token)?;

        let mut settings = ClientSettings::default();
        if let Some(base_url) = cli.base_url {
            settings.base_url = validate_base_url(&base_url)?;
        }
        if let Some(concurrency) = cli.concurrency {
            if concurrency == 0 {
                return Err(AppError::MissingConfiguration(
                    "--concurrency must be at least 1".to_string(),
                ));
            }
            settings.rate_limit.concurrent_limit = concurrency;
        }

        Ok(Self {
            token,
            settings,
            action: Action::try_from(cli.command)?,
            verbose: cli.verbose,
        })
    }
}

fn validate_base_url(input: &str) -> Result<String, ValidationError> {
    let url = url::Url::parse(input).map_err(|e| ValidationError::InvalidUrl {
        url: input.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ValidationError::InvalidUrl {
            url: input.to_string(),
            reason: "expected an http(s) URL".to_string(),
        });
    }
    Ok(input.trim_end_matches('/').to_string())
}
