//! `roster` command-line entry point.
//!
//! # Responsibility
//! - Own the process-boundary resources: logging and the store connection.
//! - Pick a repository backend, inject it into `UserService`, run one
//!   command, then close the store.

use clap::{Parser, Subcommand};
use log::error;
use roster_core::db::{close_db, open_db, set_sql_echo, DEFAULT_DB_FILE_NAME};
use roster_core::{
    core_version, default_log_level, init_logging, InMemoryUserRepository, SqliteUserRepository,
    User, UserId, UserRepository, UserService,
};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

/// Soft-delete user roster backed by SQLite.
#[derive(Parser, Debug)]
#[command(name = "roster", version, about, long_about = None)]
struct Cli {
    /// SQLite database file
    #[arg(long, global = true, default_value = DEFAULT_DB_FILE_NAME)]
    db: PathBuf,

    /// Use a throwaway in-memory store instead of SQLite
    #[arg(long, global = true)]
    memory: bool,

    /// Log every SQL statement at debug level
    #[arg(long, global = true)]
    echo_sql: bool,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, global = true, default_value = default_log_level())]
    log_level: String,

    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long, global = true)]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a user and print it
    Create { first_name: String, last_name: String },
    /// Print an active user
    Get { id: String },
    /// Soft-delete a user
    Delete { id: String },
    /// Run create -> get -> delete -> get end to end
    Demo,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_exit module=cli status=error error={}", err);
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        init_logging(&cli.log_level, log_dir)?;
    }
    println!("roster_core version={}", core_version());

    if cli.memory {
        let service = UserService::new(InMemoryUserRepository::new());
        return execute(&service, &cli.command);
    }

    let mut conn = open_db(&cli.db)?;
    set_sql_echo(&mut conn, cli.echo_sql);
    let result = execute(
        &UserService::new(SqliteUserRepository::new(&conn)),
        &cli.command,
    );
    close_db(conn)?;
    result
}

fn execute<R: UserRepository>(
    service: &UserService<R>,
    command: &Command,
) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Create {
            first_name,
            last_name,
        } => {
            let user = service.create_user(first_name.as_str(), last_name.as_str())?;
            print_user("created", &user);
        }
        Command::Get { id } => match service.get_user(&UserId::from(id.as_str()))? {
            Some(user) => print_user("found", &user),
            None => println!("status=not_found id={id}"),
        },
        Command::Delete { id } => match service.get_user(&UserId::from(id.as_str()))? {
            Some(mut user) => {
                service.delete_user(&mut user)?;
                print_user("deleted", &user);
            }
            None => println!("status=not_found id={id}"),
        },
        Command::Demo => run_demo(service)?,
    }
    Ok(())
}

fn run_demo<R: UserRepository>(service: &UserService<R>) -> Result<(), Box<dyn Error>> {
    let mut user = service.create_user("guido", "van rossum")?;
    print_user("created", &user);

    let id = user.id.clone().ok_or("created user has no id")?;
    match service.get_user(&id)? {
        Some(found) => print_user("found", &found),
        None => return Err(format!("user {id} missing right after create").into()),
    }

    service.delete_user(&mut user)?;
    print_user("deleted", &user);

    let after = service.get_user(&id)?;
    println!("status=lookup_after_delete id={id} found={}", after.is_some());
    Ok(())
}

fn print_user(status: &str, user: &User) {
    println!(
        "status={} id={} first_name={:?} last_name={:?} created_at={} deleted_at={}",
        status,
        user.id.as_ref().map_or("none", UserId::as_str),
        user.first_name,
        user.last_name,
        user.created_at.to_rfc3339(),
        user.deleted_at
            .map_or_else(|| "none".to_string(), |at| at.to_rfc3339())
    );
}
