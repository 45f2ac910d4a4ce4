use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use rolodex_core::{config_schema_json, Contact, ContactDraft, ContactId, Flash, Settings, StoreBackend};
use rolodex_store::{Directory, DirectoryError};
use serde_json::json;

#[derive(Parser)]
#[command(name = "rolodex", version, about = "Manage the Rolodex contact directory")]
struct Cli {
    /// SQLite database file (overrides ROLODEX_DB and the config file)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Print JSON instead of plain text
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every contact in insertion order
    List,
    /// Show one contact by name
    Show { name: String },
    /// Add a new contact
    Add(AddArgs),
    /// Edit the contact currently named ORIGINAL
    Edit(EditArgs),
    /// Delete a contact by name or id
    Delete(DeleteArgs),
    /// Configuration helpers
    Config {
        #[command(subcommand)]
        cmd: ConfigCmd,
    },
}

#[derive(Args)]
struct AddArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    email: String,
}

#[derive(Args)]
struct EditArgs {
    /// Current name of the contact
    original: String,
    /// New name; unchanged when omitted
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    email: Option<String>,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct DeleteArgs {
    name: Option<String>,
    #[arg(long)]
    id: Option<String>,
}

#[derive(Subcommand)]
enum ConfigCmd {
    /// Print the JSON schema for the config file
    Schema,
    /// Print the effective settings after config and environment overlays
    Show,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    rolodex_otel::init_stderr("warn");

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        if let Some(DirectoryError::Rejected(errors)) = err.downcast_ref::<DirectoryError>() {
            for e in errors {
                eprintln!("{}: {}", e.field().as_str(), e.code());
            }
            std::process::exit(2);
        }
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut settings = Settings::from_env().context("failed to resolve settings")?;
    if let Some(db) = cli.db {
        settings.backend = StoreBackend::Sqlite;
        settings.db_path = db;
    }

    if let Commands::Config { cmd } = &cli.command {
        let value = match cmd {
            ConfigCmd::Schema => config_schema_json(),
            ConfigCmd::Show => json!({
                "bind": settings.bind,
                "port": settings.port,
                "backend": settings.backend,
                "db_path": settings.db_path.display().to_string(),
            }),
        };
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    tracing::debug!(
        backend = ?settings.backend,
        db = %settings.db_path.display(),
        "opening contact directory"
    );
    let directory = Directory::from_settings(&settings)
        .with_context(|| format!("failed to open {}", settings.db_path.display()))?;
    let flash = Flash::new();
    let out = Output { json: cli.json };

    match cli.command {
        Commands::List => {
            let contacts = directory.list_all().await?;
            out.contacts(&contacts)?;
        }
        Commands::Show { name } => {
            let contact = find_named(&directory, &name).await?;
            out.contact(&contact)?;
        }
        Commands::Add(args) => {
            let draft = ContactDraft::new(args.name, args.phone, args.email);
            let contact = directory.submit_create(draft, &flash).await?;
            out.committed(&flash, Some(&contact))?;
        }
        Commands::Edit(args) => {
            let current = find_named(&directory, &args.original).await?;
            let draft = ContactDraft {
                name: args.name.unwrap_or(current.name),
                phone: args.phone.unwrap_or(current.phone),
                email: args.email.unwrap_or(current.email),
            };
            let contact = directory
                .submit_update(current.id, draft, &args.original, &flash)
                .await?;
            out.committed(&flash, Some(&contact))?;
        }
        Commands::Delete(args) => {
            let removed = match (args.name, args.id) {
                (_, Some(raw)) => {
                    let id: ContactId = raw.parse()?;
                    directory.submit_delete_by_id(id, &flash).await?
                }
                (Some(name), None) => directory.submit_delete(&name, &flash).await?,
                (None, None) => return Err(anyhow!("delete needs a NAME or --id")),
            };
            out.committed(&flash, removed.as_ref())?;
        }
        Commands::Config { .. } => {}
    }
    Ok(())
}

async fn find_named(directory: &Directory, name: &str) -> Result<Contact> {
    match directory.find_by_name(name).await {
        Ok(contact) => Ok(contact),
        Err(DirectoryError::NotFound) => Err(anyhow!("contact '{name}' not found")),
        Err(err) => Err(err.into()),
    }
}

struct Output {
    json: bool,
}

impl Output {
    fn contacts(&self, contacts: &[Contact]) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(contacts)?);
        } else {
            for c in contacts {
                println!("{}\t{}\t{}", c.name, c.phone, c.email);
            }
        }
        Ok(())
    }

    fn contact(&self, contact: &Contact) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(contact)?);
        } else {
            println!("id:      {}", contact.id);
            println!("name:    {}", contact.name);
            println!("phone:   {}", contact.phone);
            println!("email:   {}", contact.email);
            println!("created: {}", contact.created);
            println!("updated: {}", contact.updated);
        }
        Ok(())
    }

    /// Reports a committed mutation: the pending notice, plus the affected
    /// record in JSON mode.
    fn committed(&self, flash: &Flash, contact: Option<&Contact>) -> Result<()> {
        let notice = flash.take();
        if self.json {
            let body = json!({
                "msg": notice.map(|n| n.message()),
                "contact": contact,
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        } else if let Some(notice) = notice {
            println!("{notice}");
        }
        Ok(())
    }
}
