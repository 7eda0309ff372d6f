//! Terminal front end.
//!
//! Each subcommand opens its route through the guard, drives the matching
//! view, prints what the view would render and then the pending toasts.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use lodge_shared::types::{Decision, MarkerCategory, MarkerId, UserId, VoteId};

use crate::config::ClientConfig;
use crate::nav::Route;
use crate::state::{AppState, SessionUser};
use crate::views::{
    DashboardMode, DashboardView, EntryView, LoginForm, MapView, ModalEvent, NavBar, ProfileView,
    RegisterForm,
};

#[derive(Parser, Debug)]
#[command(name = "lodge", version, about = "Lodge sightings client")]
pub struct Cli {
    /// Backend base URL
    #[arg(long, env = "LODGE_API_URL")]
    pub api_url: Option<String>,

    /// Path of the local session database
    #[arg(long, env = "LODGE_STORAGE_PATH")]
    pub storage: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Pass the entry password gate
    Enter { password: String },
    Login { username: String, password: String },
    Register {
        email: String,
        username: String,
        password: String,
    },
    Logout,
    /// Show the stored session user and navigation links
    Whoami,
    #[command(subcommand)]
    Markers(MarkerCommand),
    Dashboard {
        #[command(subcommand)]
        action: Option<DashboardCommand>,
    },
    Votes {
        #[command(subcommand)]
        action: Option<VoteCommand>,
    },
}

#[derive(Subcommand, Debug)]
pub enum MarkerCommand {
    List,
    Add {
        #[arg(allow_hyphen_values = true)]
        lat: f64,
        #[arg(allow_hyphen_values = true)]
        lng: f64,
        #[arg(default_value = "other")]
        category: MarkerCategory,
    },
    Delete { id: MarkerId },
}

#[derive(Subcommand, Debug)]
pub enum DashboardCommand {
    Show,
    /// Start a ban vote against a listed user
    Nominate { user_id: UserId },
    Invite { email: String },
    /// Trigger the compromised protocol
    Compromised {
        /// Confirm without prompting
        #[arg(long)]
        yes: bool,
    },
    /// Download the server backup into a directory
    Export {
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
    /// Restore a backup file on the server
    Import { file: PathBuf },
}

#[derive(Subcommand, Debug)]
pub enum VoteCommand {
    List,
    Cast { id: VoteId, decision: Decision },
    Promote,
    /// Follow the countdowns live
    Watch {
        #[arg(long, default_value_t = 10)]
        seconds: u64,
    },
}

impl Cli {
    pub fn config(&self) -> ClientConfig {
        let mut config = ClientConfig::from_env();
        if let Some(url) = &self.api_url {
            config = config.with_api_url(url);
        }
        if let Some(path) = &self.storage {
            config = config.with_storage_path(path);
        }
        config
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let state = AppState::open(cli.config()).context("failed to open client state")?;
    let result = dispatch(&state, cli.command).await;
    flush_toasts(&state);
    result
}

async fn dispatch(state: &AppState, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Enter { password } => {
            let mut view = EntryView::new();
            if view.submit(state, &password).await? {
                println!("Entry granted. Next: lodge login");
            } else if let Some(error) = view.error {
                println!("{error}");
            }
        }
        Command::Login { username, password } => {
            if !open(state, Route::Login)? {
                return Ok(());
            }
            let mut form = LoginForm::new(username, password);
            if form.submit(state).await? {
                println!("Logged in.");
            } else {
                print_form_errors(&form.errors);
            }
        }
        Command::Register {
            email,
            username,
            password,
        } => {
            if !open(state, Route::Register)? {
                return Ok(());
            }
            let mut form = RegisterForm::new(email, username, password);
            if form.submit(state).await? {
                println!("Registered. Next: lodge login");
            } else {
                print_form_errors(&form.errors);
            }
        }
        Command::Logout => NavBar::logout(state)?,
        Command::Whoami => whoami(state)?,
        Command::Markers(action) => markers(state, action).await?,
        Command::Dashboard { action } => {
            dashboard(state, action.unwrap_or(DashboardCommand::Show)).await?
        }
        Command::Votes { action } => votes(state, action.unwrap_or(VoteCommand::List)).await?,
    }
    Ok(())
}

/// Open a route through the guard; false when we were sent elsewhere.
fn open(state: &AppState, route: Route) -> anyhow::Result<bool> {
    let landed = state.open_route(route.clone())?;
    if landed != route {
        println!("Access to {route} denied, redirected to {landed}. Run `lodge enter <password>` first.");
        return Ok(false);
    }
    Ok(true)
}

fn whoami(state: &AppState) -> anyhow::Result<()> {
    match state.session_user()? {
        SessionUser::Present(user) => {
            println!("{} <{}> {}", user.username, user.email, user.role.label());
            if user.is_inquisitor {
                println!("inquisitor");
            }
        }
        SessionUser::Missing => println!("Not logged in."),
        SessionUser::Corrupt => println!("Stored user data is unreadable. Log in again."),
    }
    let links: Vec<_> = NavBar::links(state)
        .into_iter()
        .map(|l| format!("{} ({})", l.label, l.route))
        .collect();
    println!("{}", links.join(" | "));
    Ok(())
}

async fn markers(state: &AppState, action: MarkerCommand) -> anyhow::Result<()> {
    if !open(state, Route::Map)? {
        return Ok(());
    }
    let mut view = MapView::new();
    view.load_markers(state).await?;

    match action {
        MarkerCommand::List => {
            for pin in view.pins() {
                let id = pin.id.map(|id| id.to_string()).unwrap_or_else(|| "-".into());
                println!("#{id:<5} {:<8} {}", pin.category.as_str(), pin.popup);
            }
        }
        MarkerCommand::Add { lat, lng, category } => {
            view.create_marker(state, lat, lng, category).await?;
        }
        MarkerCommand::Delete { id } => {
            view.delete_marker(state, id).await?;
        }
    }
    Ok(())
}

async fn dashboard(state: &AppState, action: DashboardCommand) -> anyhow::Result<()> {
    if !open(state, Route::Dashboard)? {
        return Ok(());
    }
    let mut view = DashboardView::mount(state).await?;

    match action {
        DashboardCommand::Show => {
            println!("{}", view.title());
            if view.mode == DashboardMode::Inquisitor {
                if view.users.is_empty() {
                    println!("No users found.");
                }
                for user in &view.users {
                    println!("#{:<5} {:<20} {:<30} {}", user.id, user.username, user.email, user.role);
                }
            }
            if view.shows_architect_actions() {
                println!("Architect actions: compromised, export, import");
            }
        }
        DashboardCommand::Nominate { user_id } => {
            view.select_user(user_id);
            view.nominate(state).await?;
        }
        DashboardCommand::Invite { email } => {
            view.invite_email = email;
            if !view.submit_invite() {
                if let Some(error) = &view.invite_error {
                    println!("{error}");
                }
            }
        }
        DashboardCommand::Compromised { yes } => {
            view.request_compromised()?;
            let event = if yes || confirm(&view.compromise_modal.message)? {
                ModalEvent::Confirm
            } else {
                ModalEvent::Cancel
            };
            if !view.handle_modal(state, event).await? {
                println!("Aborted.");
            }
        }
        DashboardCommand::Export { dir } => {
            if let Some(path) = view.export_backup(state, &dir).await? {
                println!("{}", path.display());
            }
        }
        DashboardCommand::Import { file } => {
            view.import_backup(state, &file).await?;
        }
    }
    Ok(())
}

async fn votes(state: &AppState, action: VoteCommand) -> anyhow::Result<()> {
    if !open(state, Route::Profile)? {
        return Ok(());
    }
    let mut view = ProfileView::mount(state).await?;

    match action {
        VoteCommand::List => {
            print_votes(&view);
            if let Some(status) = &view.promotion {
                println!("{}", status.message());
                if let Some(label) = status.button_label() {
                    println!("[{label}]");
                }
            }
        }
        VoteCommand::Cast { id, decision } => {
            view.cast_vote(state, id, decision).await?;
        }
        VoteCommand::Promote => {
            view.request_promotion(state).await?;
        }
        VoteCommand::Watch { seconds } => {
            for _ in 0..seconds {
                print_votes(&view);
                println!();
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }
    }
    Ok(())
}

fn print_votes(view: &ProfileView) {
    let rows = view.rows();
    if rows.is_empty() {
        println!("No active votes available for you at the moment.");
    }
    for row in rows {
        println!(
            "#{:<4} {:<30} {}  cast {} (agree {} / disagree {})  {}",
            row.id,
            row.title,
            row.time_left,
            row.counts.total_cast,
            row.counts.agree,
            row.counts.disagree,
            row.action.label()
        );
    }
}

fn print_form_errors(errors: &lodge_shared::validation::FormErrors) {
    for (field, message) in errors.iter() {
        println!("{field}: {message}");
    }
}

fn confirm(message: &str) -> anyhow::Result<bool> {
    print!("{message} [y/N] ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(matches!(line.trim(), "y" | "Y" | "yes"))
}

fn flush_toasts(state: &AppState) {
    for toast in state.notifier.drain() {
        println!("{toast}");
    }
}
