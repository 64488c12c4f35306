use std::time::Duration;

use clap::Parser;
use colored::*;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use tasklist_client::{init_logging, open, ClientConfig, DetailController, ListController};
use tasklist_core::{Action, ListView, Priority, Resource, SearchBarState, Task};
use tokio::sync::watch;

#[derive(Parser)]
#[command(name = "task-shell")]
#[command(about = "Interactive to-do list backed by a local SQLite file", long_about = None)]
struct Cli {
    /// Database file name (will auto-create in databases/ directory)
    #[arg(short, long)]
    database: Option<String>,

    /// Log filter used when RUST_LOG is not set
    #[arg(short, long, default_value = "warn")]
    log: String,
}

const SETTLE: Duration = Duration::from_millis(500);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli.log);

    let mut config = ClientConfig::from_env()?;
    if let Some(name) = &cli.database {
        std::fs::create_dir_all("databases")?;
        config = config.with_database_url(format!("sqlite:databases/{}.sqlite3", name));
    }

    println!("{}", "📝 Task Shell".bold().cyan());
    println!("{}", "=============".cyan());
    println!("📁 Database: {}", config.database_url.green());
    if config.is_in_memory() {
        println!("{}", "⚠️  In-memory database, nothing is kept on exit".yellow());
    }
    println!();

    let (repository, sort_preferences) = open(&config).await?;
    let list = ListController::new(repository.clone(), sort_preferences);
    let detail = DetailController::with_config(repository, &config);
    list.read_sort_state();

    loop {
        let choices = vec![
            "📋 List tasks",
            "➕ Create new task",
            "✏️  Edit task",
            "🗑️  Delete task",
            "🔍 Search",
            "↕️  Sort by priority",
            "🔎 View task as JSON",
            "💥 Delete all tasks",
            "❌ Exit",
        ];

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("What would you like to do?")
            .items(&choices)
            .default(0)
            .interact()?;

        match selection {
            0 => show_tasks(&list).await,
            1 => create_task(&list, &detail).await?,
            2 => edit_task(&list, &detail).await?,
            3 => delete_task(&list, &detail).await?,
            4 => search_tasks(&list).await?,
            5 => sort_tasks(&list).await?,
            6 => view_task_json(&list)?,
            7 => delete_all_tasks(&list, &detail).await?,
            8 => {
                if Confirm::with_theme(&ColorfulTheme::default())
                    .with_prompt("Are you sure you want to exit?")
                    .default(false)
                    .interact()?
                {
                    println!("👋 Goodbye!");
                    break;
                }
            }
            _ => unreachable!(),
        }
        println!();
    }

    list.cancel_all();
    detail.cancel_all();
    Ok(())
}

/// Gives a background collector a moment to publish the next state.
async fn settle<T>(rx: &mut watch::Receiver<T>) {
    let _ = tokio::time::timeout(SETTLE, rx.changed()).await;
}

async fn show_tasks(list: &ListController) {
    let mut all = list.watch_all_tasks();
    let _ = tokio::time::timeout(SETTLE, all.wait_for(|s| !s.is_loading())).await;

    let heading = match list.list_view() {
        ListView::All => "📋 All tasks".to_string(),
        ListView::Search => format!("🔍 Results for {:?}", list.search_text()),
        ListView::LowFirst => "⬆️  Lowest priority first".to_string(),
        ListView::HighFirst => "⬇️  Highest priority first".to_string(),
    };
    println!("{}", heading.bold());
    println!("{}", "─".repeat(72).dimmed());

    match list.visible_tasks() {
        Resource::Idle | Resource::Loading => println!("{}", "⏳ Loading...".dimmed()),
        Resource::Error(e) => println!("❌ {}", e.to_string().red()),
        Resource::Success(tasks) if tasks.is_empty() => println!("📭 No tasks found."),
        Resource::Success(tasks) => {
            for task in &tasks {
                print_task(task);
            }
        }
    }
}

fn print_task(task: &Task) {
    let priority = match task.priority {
        Priority::High => "HIGH".red().bold(),
        Priority::Medium => "MEDIUM".yellow(),
        Priority::Low => "LOW".green(),
        Priority::None => "NONE".dimmed(),
    };
    println!(
        "{:>4}  {:<8} {}  {}",
        task.id.to_string().dimmed(),
        priority,
        task.title.bold(),
        task.description.dimmed()
    );
}

fn choose_task(
    list: &ListController,
    prompt: &str,
) -> Result<Option<Task>, Box<dyn std::error::Error>> {
    let tasks = match list.all_tasks() {
        Resource::Success(tasks) if !tasks.is_empty() => tasks,
        _ => {
            println!("📭 No tasks to choose from.");
            return Ok(None);
        }
    };

    let labels: Vec<String> = tasks
        .iter()
        .map(|t| format!("{} [{}] {}", t.id, t.priority, t.title))
        .collect();
    let index = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(tasks.into_iter().nth(index))
}

/// Prompts for every draft field, keeping the current values as defaults.
fn edit_draft(detail: &DetailController) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        let title: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Title")
            .with_initial_text(detail.title())
            .allow_empty(true)
            .interact_text()?;
        if detail.set_title(title) {
            break;
        }
        println!(
            "{}",
            format!(
                "Title must be shorter than {} characters",
                detail.max_title_length()
            )
            .yellow()
        );
    }

    let description: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Description")
        .with_initial_text(detail.description())
        .allow_empty(true)
        .interact_text()?;
    detail.set_description(description);

    let labels: Vec<String> = Priority::ALL.iter().map(|p| p.to_string()).collect();
    let current = Priority::ALL
        .iter()
        .position(|p| *p == detail.priority())
        .unwrap_or(0);
    let index = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Priority")
        .items(&labels)
        .default(current)
        .interact()?;
    detail.set_priority(Priority::ALL[index]);
    Ok(())
}

async fn commit(
    list: &ListController,
    detail: &DetailController,
    action: Action,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut all = list.watch_all_tasks();
    if let Some(handle) = detail.commit(action) {
        match handle.await? {
            Ok(()) => {
                settle(&mut all).await;
                println!("✅ {}", action.to_string().green());
            }
            Err(e) => println!("❌ {} failed: {}", action, e.to_string().red()),
        }
    }
    Ok(())
}

async fn create_task(
    list: &ListController,
    detail: &DetailController,
) -> Result<(), Box<dyn std::error::Error>> {
    detail.update_task_fields(None);
    edit_draft(detail)?;

    if !detail.validate() {
        println!("{}", "⚠️  Title and description are required".yellow());
        return Ok(());
    }
    commit(list, detail, Action::Add).await
}

async fn edit_task(
    list: &ListController,
    detail: &DetailController,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(task) = choose_task(list, "Which task?")? else {
        return Ok(());
    };

    detail.load_task(task.id);
    let mut draft = detail.watch_draft();
    let _ = tokio::time::timeout(SETTLE, draft.wait_for(|d| d.id == task.id)).await;
    edit_draft(detail)?;

    if !detail.validate() {
        println!("{}", "⚠️  Title and description are required".yellow());
        return Ok(());
    }
    commit(list, detail, Action::Update).await
}

async fn delete_task(
    list: &ListController,
    detail: &DetailController,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(task) = choose_task(list, "Delete which task?")? else {
        return Ok(());
    };

    let mut all = list.watch_all_tasks();
    if let Err(e) = list.delete_task(task.clone()).await? {
        println!("❌ Delete failed: {}", e.to_string().red());
        return Ok(());
    }
    settle(&mut all).await;
    println!("🗑️  Deleted {}", task.title.bold());

    if Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Undo?")
        .default(false)
        .interact()?
    {
        detail.update_task_fields(Some(&task));
        commit(list, detail, Action::Undo).await?;
    }
    Ok(())
}

async fn search_tasks(list: &ListController) -> Result<(), Box<dyn std::error::Error>> {
    if list.search_bar_state() == SearchBarState::Triggered {
        let clear = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Clear the current search?")
            .default(true)
            .interact()?;
        if clear {
            list.set_search_text("");
            list.set_search_bar_state(SearchBarState::Closed);
            return Ok(());
        }
    }

    list.set_search_bar_state(SearchBarState::Opened);
    let query: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Search for")
        .with_initial_text(list.search_text())
        .allow_empty(true)
        .interact_text()?;
    list.set_search_text(query.clone());
    list.search(&query);

    let mut searched = list.watch_searched_tasks();
    let _ = tokio::time::timeout(SETTLE, searched.wait_for(|s| !s.is_loading())).await;
    show_tasks(list).await;
    Ok(())
}

async fn sort_tasks(list: &ListController) -> Result<(), Box<dyn std::error::Error>> {
    let choices = ["Lowest priority first", "Highest priority first", "Unsorted"];
    let index = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Sort order")
        .items(&choices)
        .default(0)
        .interact()?;
    let priority = match index {
        0 => Priority::Low,
        1 => Priority::High,
        _ => Priority::Medium,
    };

    let mut sort = list.watch_sort_state();
    list.persist_sort_state(priority).await?;
    let _ = tokio::time::timeout(SETTLE, sort.wait_for(|s| s.success() == Some(&priority)))
        .await;
    show_tasks(list).await;
    Ok(())
}

fn view_task_json(list: &ListController) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(task) = choose_task(list, "Which task?")? {
        println!("{}", serde_json::to_string_pretty(&task)?);
    }
    Ok(())
}

async fn delete_all_tasks(
    list: &ListController,
    detail: &DetailController,
) -> Result<(), Box<dyn std::error::Error>> {
    if Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Delete every task?")
        .default(false)
        .interact()?
    {
        commit(list, detail, Action::from_route_arg("DELETE_ALL")).await?;
    }
    Ok(())
}
