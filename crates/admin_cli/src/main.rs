use std::{error::Error, io::Write};

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    terminal,
};
use engine::{Engine, EngineError, NewPlanCmd};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "planner_admin")]
#[command(about = "Admin utilities for the budget planner (bootstrap users/plans)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./planner.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Plan(Plan),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    name: Option<String>,
}

#[derive(Args, Debug)]
struct Plan {
    #[command(subcommand)]
    command: PlanCommand,
}

#[derive(Subcommand, Debug)]
enum PlanCommand {
    Create(PlanCreateArgs),
}

#[derive(Args, Debug)]
struct PlanCreateArgs {
    /// Email of the owner; their password is asked interactively.
    #[arg(long)]
    owner: String,
    #[arg(long)]
    title: String,
    /// Budget ceiling in minor units.
    #[arg(long)]
    budget_cents: i64,
    /// First day of the period (YYYY-MM-DD).
    #[arg(long)]
    start: NaiveDate,
    /// Last day of the period (YYYY-MM-DD).
    #[arg(long)]
    end: NaiveDate,
    /// Background color as `#RRGGBB`.
    #[arg(long)]
    color: Option<String>,
}

/// Read a line from the terminal without echoing it.
fn read_secret(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    eprint!("{prompt}");
    std::io::stderr().flush()?;

    terminal::enable_raw_mode()?;
    let secret = read_keys();
    terminal::disable_raw_mode()?;
    eprintln!();
    secret
}

fn read_keys() -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut secret = String::new();
    loop {
        if let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        {
            match code {
                KeyCode::Enter => return Ok(secret),
                KeyCode::Backspace => {
                    secret.pop();
                }
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                    return Err("interrupted".into());
                }
                KeyCode::Char(ch) => secret.push(ch),
                _ => {}
            }
        }
    }
}

fn new_password() -> Result<String, Box<dyn Error + Send + Sync>> {
    let password = read_secret("Password: ")?;
    if password.is_empty() {
        return Err("password must not be empty".into());
    }
    if read_secret("Confirm password: ")? != password {
        return Err("passwords do not match".into());
    }
    Ok(password)
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let password = new_password()?;

            let user = match engine
                .register_user(&args.email, &password, args.name.as_deref())
                .await
            {
                Ok(user) => user,
                Err(EngineError::ExistingKey(email)) => {
                    eprintln!("user already exists: {email}");
                    std::process::exit(1);
                }
                Err(err) => return Err(err.into()),
            };

            println!("created user: {} ({})", user.email, user.id);
        }
        Command::Plan(Plan {
            command: PlanCommand::Create(args),
        }) => {
            let password = read_secret(&format!("Password for {}: ", args.owner))?;
            let owner = match engine.authenticate(&args.owner, &password).await {
                Ok(user) => user,
                Err(EngineError::KeyNotFound(_)) => {
                    eprintln!("unknown user or wrong password: {}", args.owner);
                    std::process::exit(1);
                }
                Err(err) => return Err(err.into()),
            };

            let mut cmd = NewPlanCmd::new(&args.title, args.budget_cents, args.start, args.end);
            if let Some(color) = args.color {
                cmd = cmd.background_color(color);
            }
            let plan = match engine.create_plan(owner.id, cmd).await {
                Ok(plan) => plan,
                Err(EngineError::InvalidInput(msg)) => {
                    eprintln!("{msg}");
                    std::process::exit(2);
                }
                Err(err) => return Err(err.into()),
            };
            println!("created plan: {} ({})", plan.title, plan.id);
        }
    }

    Ok(())
}
