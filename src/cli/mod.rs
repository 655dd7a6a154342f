//! Command-line interface: run the server or manage the database.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::auth::AuthService;
use crate::config::Config;
use crate::data::{Database, FeedbackStore, NewTask, TaskStore, UserStore};
use crate::web::{run_server, AppState};

pub const SAMPLE_TASK_TITLE: &str = "Sample Task";
pub const SAMPLE_TASK_DESCRIPTION: &str = "This is a sample task.";

#[derive(Debug, Parser)]
#[command(name = "taskdesk")]
#[command(version, about = "Multi-user task manager served over HTTP")]
pub struct Cli {
    /// Directory holding the database and config.toml (default: ~/.taskdesk)
    #[arg(long, global = true, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run the web server until Ctrl-C
    Serve {
        /// Address to bind (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Create or upgrade the database schema
    InitDb {
        /// Create this user (if missing) and give it a sample task
        #[arg(long, requires = "sample_password")]
        sample_user: Option<String>,
        /// Password for the sample user
        #[arg(long, requires = "sample_user")]
        sample_password: Option<String>,
    },

    /// Print every task in the database
    ListTasks,

    /// Print the most recent feedback submissions
    ListFeedback {
        /// Maximum number of entries to show
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
}

impl Cli {
    /// The requested subcommand, defaulting to `serve`.
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Serve {
            host: None,
            port: None,
        })
    }
}

/// Dispatch a parsed command. The data directory must already be initialized.
pub async fn run(command: Command, config: Config) -> Result<()> {
    match command {
        Command::Serve { host, port } => {
            let mut config = config;
            if let Some(host) = host {
                config = config.with_host(host);
            }
            if let Some(port) = port {
                config = config.with_port(port);
            }
            let db = open_database()?;
            run_server(AppState::new(db, config)).await
        }
        Command::InitDb {
            sample_user,
            sample_password,
        } => {
            let db = open_database()?;
            let mut out = std::io::stdout().lock();
            init_db(&db, &config, sample_user.as_deref(), sample_password.as_deref(), &mut out)
        }
        Command::ListTasks => {
            let db = open_database()?;
            list_tasks(&db, &mut std::io::stdout().lock())
        }
        Command::ListFeedback { limit } => {
            let db = open_database()?;
            list_feedback(&db, limit, &mut std::io::stdout().lock())
        }
    }
}

fn open_database() -> Result<Database> {
    let path = crate::util::database_path();
    Database::open(path.clone())
        .with_context(|| format!("Failed to open database at {}", path.display()))
}

/// Ensure the schema exists and optionally seed a sample user and task.
pub fn init_db(
    db: &Database,
    config: &Config,
    sample_user: Option<&str>,
    sample_password: Option<&str>,
    out: &mut impl Write,
) -> Result<()> {
    // Opening the database already applied migrations
    writeln!(out, "Database initialized.")?;

    let (Some(username), Some(password)) = (sample_user, sample_password) else {
        return Ok(());
    };

    let users = UserStore::new(db.clone());
    let user = match users.get_by_username(username.trim())? {
        Some(user) => user,
        None => AuthService::new(db.clone(), config.session.ttl_hours)
            .register(username, password, password)
            .context("Failed to create sample user")?,
    };

    let task = TaskStore::new(db.clone()).create(
        user.id,
        &NewTask::new(SAMPLE_TASK_TITLE).with_description(SAMPLE_TASK_DESCRIPTION),
    )?;
    tracing::info!(user_id = user.id, task_id = task.id, "Seeded sample task");
    writeln!(out, "Sample task added for {}.", user.username)?;
    Ok(())
}

pub fn list_tasks(db: &Database, out: &mut impl Write) -> Result<()> {
    for task in TaskStore::new(db.clone()).list_all()? {
        writeln!(
            out,
            "ID: {}, Title: {}, Description: {}, Completed: {}",
            task.id,
            task.title,
            task.description.as_deref().unwrap_or(""),
            task.completed
        )?;
    }
    Ok(())
}

pub fn list_feedback(db: &Database, limit: u32, out: &mut impl Write) -> Result<()> {
    for entry in FeedbackStore::new(db.clone()).recent(limit)? {
        writeln!(
            out,
            "#{} {} {} <{}>: {}",
            entry.id,
            entry.created_at.format("%Y-%m-%d %H:%M"),
            entry.name,
            entry.email,
            entry.message
        )?;
    }
    Ok(())
}
