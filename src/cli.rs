//! TylerNote - CLI Tool
//!
//! Command-line client for a running TylerNote server.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tylernote::client::{ApiClient, DEFAULT_SERVER_URL};
use tylernote::editor::EditSession;
use tylernote::models::{CreateTodoRequest, Plan, Todo};
use tylernote::sync::DEFAULT_DELAY;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "tn")]
#[command(about = "CLI for TylerNote")]
struct Cli {
    /// TylerNote server URL
    #[arg(long, env = "TYLERNOTE_URL", default_value = DEFAULT_SERVER_URL)]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Today's plan
    Today {
        #[command(subcommand)]
        action: TodayAction,
    },

    /// Todo operations
    Todo {
        #[command(subcommand)]
        action: TodoAction,
    },

    /// Note operations
    Note {
        #[command(subcommand)]
        action: NoteAction,
    },
}

#[derive(Subcommand)]
enum TodayAction {
    /// Print today's plan
    Show,

    /// Write today's plan from stdin, autosaving as lines arrive
    Edit {
        /// Autosave delay in milliseconds
        #[arg(long, env = "TYLERNOTE_SYNC_DELAY_MS", default_value_t = DEFAULT_DELAY.as_millis() as u64)]
        delay_ms: u64,
    },
}

#[derive(Subcommand)]
enum TodoAction {
    /// List todos (open ones by default)
    List {
        /// Include completed todos
        #[arg(long)]
        all: bool,
    },

    /// Add a todo
    Add {
        /// Todo text
        text: String,
    },

    /// Mark a todo as done
    Done {
        /// Todo ID
        id: Uuid,
    },

    /// Delete a todo
    Rm {
        /// Todo ID
        id: Uuid,
    },
}

#[derive(Subcommand)]
enum NoteAction {
    /// List notes
    List {
        /// Only notes with this tag
        #[arg(short, long)]
        tag: Option<String>,
    },

    /// Add a tag to a note
    Tag {
        /// Note ID
        id: Uuid,
        tag: String,
    },

    /// Remove a tag from a note
    Untag {
        /// Note ID
        id: Uuid,
        tag: String,
    },

    /// Make a note public
    Publish {
        /// Note ID
        id: Uuid,
    },

    /// Hide a published note
    Unpublish {
        /// Note ID
        id: Uuid,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let client = ApiClient::new(&cli.server)?;

    match cli.command {
        Commands::Today { action } => handle_today(&client, action).await,
        Commands::Todo { action } => handle_todo(&client, action).await,
        Commands::Note { action } => handle_note(&client, action).await,
    }
}

async fn handle_today(client: &ApiClient, action: TodayAction) -> Result<()> {
    match action {
        TodayAction::Show => match client.today().await? {
            Some(plan) => {
                println!("Plan for {}", plan.day.format("%Y-%m-%d"));
                println!("{}", "-".repeat(40));
                println!("{}", plan.text);
            }
            None => println!("No plan for today"),
        },

        TodayAction::Edit { delay_ms } => {
            let plan = client
                .create_today("")
                .await
                .context("Failed to open today's plan")?;
            edit_plan(client, plan, std::time::Duration::from_millis(delay_ms)).await?;
        }
    }

    Ok(())
}

/// Append stdin lines to the plan, autosaving through an edit session.
async fn edit_plan(client: &ApiClient, plan: Plan, delay: std::time::Duration) -> Result<()> {
    let session: EditSession<Plan> = EditSession::new(client.clone(), plan.id, delay);
    session.on_status_change(|status| println!("Status: {}", status));

    let mut text = plan.text;
    let mut last_save = None;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(&line);
        last_save = Some(session.update_plan(text.clone()));
    }

    if let Some(save) = last_save {
        match save.await {
            Ok(saved) => println!("Saved {} characters", saved.text.chars().count()),
            Err(e) => anyhow::bail!("Failed to save plan: {}", e),
        }
    }
    session.close();
    Ok(())
}

async fn handle_todo(client: &ApiClient, action: TodoAction) -> Result<()> {
    match action {
        TodoAction::List { all } => {
            let todos = client.todos(if all { None } else { Some(false) }).await?;

            println!("{:<36} {:<6} {}", "ID", "DONE", "TEXT");
            println!("{}", "-".repeat(80));
            for todo in todos {
                println!(
                    "{:<36} {:<6} {}",
                    todo.id,
                    if todo.completed { "x" } else { "" },
                    todo.text
                );
            }
        }

        TodoAction::Add { text } => {
            let todo = client
                .create::<Todo>(&CreateTodoRequest {
                    text,
                    completed: false,
                })
                .await?;
            println!("Created todo: {}", todo.id);
        }

        TodoAction::Done { id } => {
            let patch = tylernote::models::UpdateTodoRequest {
                completed: Some(true),
                ..Default::default()
            };
            let todo = client.update::<Todo>(id, &patch).await?;
            println!("Completed: {}", todo.text);
        }

        TodoAction::Rm { id } => {
            client.delete::<Todo>(id).await?;
            println!("Deleted todo: {}", id);
        }
    }

    Ok(())
}

async fn handle_note(client: &ApiClient, action: NoteAction) -> Result<()> {
    match action {
        NoteAction::List { tag } => {
            let notes = client.notes(tag.as_deref()).await?;

            println!("{:<36} {:<4} {:<24} {}", "ID", "PUB", "TAGS", "TITLE");
            println!("{}", "-".repeat(80));
            for note in notes {
                println!(
                    "{:<36} {:<4} {:<24} {}",
                    note.id,
                    if note.published { "yes" } else { "" },
                    note.tags.join(","),
                    note.title
                );
            }
        }

        NoteAction::Tag { id, tag } => {
            let note = client.add_note_tag(id, &tag).await?;
            println!("Tags: {}", note.tags.join(", "));
        }

        NoteAction::Untag { id, tag } => {
            let note = client.remove_note_tag(id, &tag).await?;
            println!("Tags: {}", note.tags.join(", "));
        }

        NoteAction::Publish { id } => {
            let note = client.publish_note(id).await?;
            println!("Published: {}", note.title);
        }

        NoteAction::Unpublish { id } => {
            let note = client.unpublish_note(id).await?;
            println!("Unpublished: {}", note.title);
        }
    }

    Ok(())
}
