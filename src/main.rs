// src/main.rs

use anyhow::Context;
use clap::Parser;
use graphdesk::{
    report_error, Action, AppConfig, AppError, CampaignSync, CommandLineInput, DiskSyncStore,
    GraphClient, GraphRepository, LogNotifier, NewPost, PhotoUpload,
};
use log::LevelFilter;
use log4rs::{
    append::console::{ConsoleAppender, Target},
    append::file::FileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
    Config,
};
use serde_json::Value;
use std::fs;
use std::sync::Arc;

/// Sets up logging configuration.
///
/// The console appender writes to stderr so command output on stdout stays
/// machine-readable.
fn setup_logging(verbose: bool) -> anyhow::Result<()> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let log_file_path = std::env::temp_dir().join("graphdesk.log");
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let pattern = if verbose {
        "{d(%Y-%m-%d %H:%M:%S)} [{l}] {t} - {m}{n}"
    } else {
        "{m}{n}"
    };

    let stderr_appender = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] {t} - {m}{n}",
        )))
        .build(&log_file_path)?;

    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr_appender)))
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(LevelFilter::Debug)))
                .build("file", Box::new(file_appender)),
        )
        .build(
            Root::builder()
                .appender("stderr")
                .appender("file")
                .build(log_level),
        )?;

    log4rs::init_config(config)?;
    log::info!("Logging initialized. Log file: {}", log_file_path.display());
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, AppError> {
    Ok(serde_json::to_value(value)?)
}

/// Runs the resolved action and returns what should be printed.
async fn execute(config: &AppConfig) -> Result<Value, AppError> {
    let client = GraphClient::new(config.settings.clone())?;
    let token = &config.token;

    match &config.action {
        Action::Accounts => to_json(&client.ad_accounts(token).await?),
        Action::Campaigns(account) => to_json(&client.campaigns(account, token).await?),
        Action::SetStatus { campaign, status } => {
            to_json(&client.update_campaign_status(campaign, status, token).await?)
        }
        Action::Insights(campaign) => to_json(&client.campaign_insights(campaign, token).await?),
        Action::Posts { page, limit } => to_json(&client.page_posts(page, *limit, token).await?),
        Action::Inbox { page, limit } => {
            to_json(&client.page_conversations(page, *limit, token).await?)
        }
        Action::Post {
            page,
            message,
            link,
        } => {
            let mut post = NewPost::message(message.clone());
            if let Some(link) = link {
                post = post.with_link(link.clone());
            }
            to_json(&client.create_post(page, &post, token).await?)
        }
        Action::UploadPhoto {
            page,
            file,
            caption,
        } => {
            let bytes = tokio::fs::read(file).await?;
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "photo".to_string());
            let mut upload = PhotoUpload::new(bytes, file_name);
            if let Some(caption) = caption {
                upload = upload.with_caption(caption.clone());
            }
            to_json(&client.upload_photo(page, upload, token).await?)
        }
        Action::Sync { page, account } => {
            let store = DiskSyncStore::new().await?;
            let sync = CampaignSync::new(Arc::new(client), Arc::new(store), Arc::new(LogNotifier));
            to_json(&sync.sync_page(page, account, token).await?)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CommandLineInput::parse();

    setup_logging(cli.verbose).context("failed to initialize logging")?;

    let config = AppConfig::resolve(cli)?;
    log::debug!("Resolved configuration: {:?}", config);

    match execute(&config).await {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(e) => {
            if !matches!(config.action, Action::Sync { .. }) {
                report_error(&LogNotifier, "Request failed", &e);
            }
            let message = e.user_message();
            Err(anyhow::Error::new(e).context(message))
        }
    }
}
