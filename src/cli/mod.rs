//! Command-line surface over the client library.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;
use std::str::FromStr;

use crate::admin::Section;
use crate::api::models::{NewsArticle, RegisterRequest, UserProfile, Video};
use crate::engage::Outcome;
use crate::loader::{DataSource, Loaded};
use crate::LcaTv;

#[derive(Parser, Debug)]
#[command(name = "lcatv")]
#[command(author, version, about = "Client for the LCA TV media platform", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "lcatv.toml")]
    pub config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and persist the session
    Login(LoginArgs),
    /// Create an account and sign in
    Register(RegisterArgs),
    /// Clear the persisted session
    Logout,
    /// Show the profile, optionally refreshing it from the server
    Profile {
        #[arg(long)]
        refresh: bool,
    },
    /// List channel videos
    Videos {
        #[arg(long)]
        category: Option<String>,
    },
    /// List featured videos
    Featured {
        #[arg(long, default_value_t = 6)]
        limit: usize,
    },
    /// Show one video
    Video { id: String },
    /// List news articles
    News {
        #[arg(long)]
        category: Option<String>,
    },
    /// Show one news article
    Article { id: String },
    /// List program categories
    Categories,
    /// Manage favorite videos
    Favorites {
        #[command(subcommand)]
        command: FavoritesCommand,
    },
    /// Record a watch event for points
    Watch { id: String },
    /// Show the live stream status
    Live,
    /// Back-office operations
    Admin(AdminArgs),
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    pub email: String,
    #[arg(long)]
    pub password: String,
    #[arg(long)]
    pub remember_me: bool,
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[arg(long)]
    pub nom: String,
    #[arg(long)]
    pub prenom: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub telephone: String,
    #[arg(long)]
    pub password: String,
    #[arg(long)]
    pub confirm_password: String,
    #[arg(long, default_value_t = true)]
    pub accept_cgu: bool,
    #[arg(long)]
    pub newsletter: bool,
}

#[derive(Subcommand, Debug)]
pub enum FavoritesCommand {
    /// List favorite videos (requires a session)
    List,
    /// Add a video to favorites
    Add { id: String },
    /// Remove a video from favorites
    Remove { id: String },
}

#[derive(Args, Debug)]
pub struct AdminArgs {
    /// Section: users, subscriptions, advertisements, packages, videos,
    /// media, settings or overview
    pub section: String,
    #[command(subcommand)]
    pub action: AdminAction,
}

#[derive(Subcommand, Debug)]
pub enum AdminAction {
    /// Fetch the section's collection
    List,
    /// Create an item from a JSON body
    Create { body: String },
    /// Update an item from a JSON body
    Update { id: String, body: String },
    /// Delete an item
    Delete { id: String },
}

pub async fn run(app: &LcaTv, command: Command) -> Result<()> {
    match command {
        Command::Login(args) => {
            let user = app
                .login(&args.email, &args.password, args.remember_me)
                .await?;
            print_welcome(&user);
        }
        Command::Register(args) => {
            let request = RegisterRequest {
                nom: args.nom,
                prenom: args.prenom,
                email: args.email,
                telephone: args.telephone,
                password: args.password,
                confirm_password: args.confirm_password,
                accept_cgu: args.accept_cgu,
                newsletter: args.newsletter,
            };
            let user = app.register(&request).await?;
            print_welcome(&user);
        }
        Command::Logout => {
            app.logout();
            println!("Signed out");
        }
        Command::Profile { refresh } => {
            let user = if refresh {
                app.refresh_profile().await?
            } else {
                app.session
                    .user()
                    .context("No session; sign in with `lcatv login`")?
            };
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
        Command::Videos { category } => {
            let loaded = app.loader.videos(category.as_deref()).await;
            print_videos(&loaded);
        }
        Command::Featured { limit } => {
            let loaded = app.loader.featured(limit).await;
            print_videos(&loaded);
        }
        Command::Video { id } => match app.loader.video(&id).await {
            Some(video) => println!("{}", serde_json::to_string_pretty(&video)?),
            None => println!("No video with id {}", id),
        },
        Command::News { category } => {
            let loaded = app.loader.news(category.as_deref()).await;
            print_news(&loaded);
        }
        Command::Article { id } => match app.loader.article(&id).await {
            Some(article) => println!("{}", serde_json::to_string_pretty(&article)?),
            None => println!("No article with id {}", id),
        },
        Command::Categories => {
            let loaded = app.loader.categories().await;
            for category in &loaded.items {
                println!("{:12} {}", category.id, category.name);
            }
            print_source_note(loaded.source);
        }
        Command::Favorites { command } => run_favorites(app, command).await?,
        Command::Watch { id } => {
            report_outcome(app.engagement.record_watch(&id).await)?;
        }
        Command::Live => {
            let fetched = app.loader.live_status().await;
            println!("{}", serde_json::to_string_pretty(&fetched.value)?);
            print_source_note(fetched.source);
        }
        Command::Admin(args) => run_admin(app, args).await?,
    }
    Ok(())
}

async fn run_favorites(app: &LcaTv, command: FavoritesCommand) -> Result<()> {
    match command {
        FavoritesCommand::List => {
            let loaded = app.loader.favorites().await?;
            print_videos(&loaded);
        }
        FavoritesCommand::Add { id } => {
            if app.profile.is_favorite(&id) {
                println!("{} is already a favorite", id);
            } else {
                report_outcome(app.engagement.toggle_favorite(&id).await)?;
            }
        }
        FavoritesCommand::Remove { id } => {
            if !app.profile.is_favorite(&id) {
                println!("{} is not a favorite", id);
            } else {
                report_outcome(app.engagement.toggle_favorite(&id).await)?;
            }
        }
    }
    Ok(())
}

async fn run_admin(app: &LcaTv, args: AdminArgs) -> Result<()> {
    let section = Section::from_str(&args.section).map_err(|err| anyhow::anyhow!(err))?;
    let body = match args.action {
        AdminAction::List => app.admin.list(section).await?,
        AdminAction::Create { body } => {
            let body: Value = serde_json::from_str(&body).context("Body is not valid JSON")?;
            app.admin.create(section, &body).await?
        }
        AdminAction::Update { id, body } => {
            let body: Value = serde_json::from_str(&body).context("Body is not valid JSON")?;
            app.admin.update(section, &id, &body).await?
        }
        AdminAction::Delete { id } => app.admin.remove(section, &id).await?,
    };
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

fn print_welcome(user: &UserProfile) {
    println!(
        "Signed in as {} {} ({} points)",
        user.prenom, user.nom, user.points
    );
}

fn print_videos(loaded: &Loaded<Video>) {
    for video in &loaded.items {
        let duration = video.duration.as_deref().unwrap_or("-");
        println!(
            "{:12} {:8} {:10} {}",
            video.id, duration, video.category, video.title
        );
    }
    print_source_note(loaded.source);
}

fn print_news(loaded: &Loaded<NewsArticle>) {
    for article in &loaded.items {
        println!(
            "{:22} {:10} {}",
            article.id, article.category, article.title
        );
    }
    print_source_note(loaded.source);
}

fn print_source_note(source: DataSource) {
    if source == DataSource::Fallback {
        println!("(offline fallback content)");
    }
}

fn report_outcome(outcome: Outcome) -> Result<()> {
    match outcome {
        Outcome::Confirmed { points_earned } if points_earned > 0 => {
            println!("Done (+{} points)", points_earned);
        }
        Outcome::Confirmed { .. } => println!("Done"),
        Outcome::RolledBack { error } => {
            anyhow::bail!("action failed: {}", error.user_message());
        }
        Outcome::AuthRequired => {
            anyhow::bail!("No session; sign in with `lcatv login`");
        }
        Outcome::InFlight => println!("Already in progress"),
    }
    Ok(())
}
