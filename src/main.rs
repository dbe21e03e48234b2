use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use tasklist::actions::Action;
use tasklist::app::AppState;
use tasklist::config::Config;
use tasklist::constants::{CONFIG_GENERATED, LOG_LINES_ON_FAILURE};
use tasklist::sync::Synced;
use tasklist::{logger, ListDraft, Task, TaskDraft};

#[derive(clap::Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file to use instead of the default locations
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Show all lists
    Lists,
    /// Show the tasks of a list
    Tasks { list: i64 },
    /// Show the details of one task
    Show { task: i64 },
    /// Show starred tasks that are still open
    Starred,
    /// Show tasks due today
    Today,
    /// Create a list
    AddList {
        name: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Create a task in a list
    AddTask { list: i64, title: String },
    /// Toggle the starred flag of a task
    Star { task: i64 },
    /// Toggle the completed flag of a task
    Check { task: i64 },
    /// Push changes made while offline
    Sync,
    /// Sign in and remember the token
    Login { username: String, password: String },
    /// Sign out and forget the token
    Logout,
    /// Write a default configuration file
    InitConfig,
}

fn print_origin<T>(result: &Synced<T>) {
    if let Some(reason) = result.fallback_reason() {
        eprintln!("⚠️  Showing local data: {}", reason);
    }
}

fn print_task(task: &Task) {
    let check = if task.completed { "x" } else { " " };
    let star = if task.starred { " ⭐" } else { "" };
    let deadline = task.deadline.map(|d| format!(" (due {})", d)).unwrap_or_default();
    println!("{:>4} [{}] {}{}{}", task.id, check, task.title, star, deadline);
}

fn print_task_details(task: &Task) {
    print_task(task);
    if let Some(description) = task.description.as_deref().filter(|d| !d.is_empty()) {
        println!("     {}", description);
    }
    println!("     Progress: {}%", task.completion_rate);
    if let Some(duration) = task.completion_duration() {
        println!("     Completed in {}", duration);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Command::InitConfig = cli.command {
        let path = match cli.config {
            Some(path) => path,
            None => Config::get_default_config_path()?,
        };
        Config::generate_default_config(&path)?;
        println!("{}: {}", CONFIG_GENERATED, path.display());
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::load()?,
    };
    let logs = logger::init(&config.logging)?;
    let app = AppState::bootstrap(config).await?;

    let result = run(&app, cli.command).await;
    if result.is_err() {
        for line in logs.get_logs().iter().take(LOG_LINES_ON_FAILURE).rev() {
            eprintln!("{}", line);
        }
    }
    result
}

async fn run(app: &AppState, command: Command) -> Result<()> {
    match command {
        Command::Lists => {
            let lists = app.sync.get_lists().await?;
            print_origin(&lists);
            for list in &lists.value {
                let description = list.description.as_deref().unwrap_or("");
                println!("{:>4} {} {}", list.id, list.name, description);
            }
        }
        Command::Tasks { list } => {
            let tasks = app.sync.get_tasks(list).await?;
            print_origin(&tasks);
            tasks.value.iter().for_each(print_task);
        }
        Command::Show { task } => {
            let task = app.sync.get_task(task).await?;
            print_origin(&task);
            print_task_details(&task.value);
        }
        Command::Starred => {
            app.sync.get_starred_tasks().await?.iter().for_each(print_task);
        }
        Command::Today => {
            let tasks = app.sync.get_tasks_due_today().await?;
            print_origin(&tasks);
            tasks.value.iter().for_each(print_task);
        }
        Command::AddList { name, description } => {
            let draft = ListDraft {
                name,
                description,
            };
            println!("{}", app.dispatch(Action::CreateList(draft)).await?);
        }
        Command::AddTask { list, title } => {
            let action = Action::CreateTask {
                list_id: list,
                draft: TaskDraft::new(title),
            };
            println!("{}", app.dispatch(action).await?);
        }
        Command::Star { task } => {
            let task = app.sync.get_task(task).await?.into_inner();
            println!("{}", app.dispatch(Action::StarTask(task)).await?);
        }
        Command::Check { task } => {
            let task = app.sync.get_task(task).await?.into_inner();
            println!("{}", app.dispatch(Action::CheckTask(task)).await?);
        }
        Command::Sync => {
            println!("{}", app.dispatch(Action::Reconcile).await?);
        }
        Command::Login { username, password } => {
            app.account.log_in(&username, &password).await?;
            println!("🔑 Signed in as {}", username);
        }
        Command::Logout => {
            app.account.log_out().await?;
            println!("🔒 Signed out");
        }
        Command::InitConfig => {}
    }

    Ok(())
}
