//! AgentDesk CLI
//!
//! Command-line front end for the dashboard client core:
//! - Show and change the agent's status
//! - Monthly sales ranking
//! - Agent and site administration
//! - UI preferences

use anyhow::Context;
use async_trait::async_trait;
use chrono::{Local, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agentdesk::admin::{users, ActionOutcome, AdminPanel, Confirm, ConfirmPrompt, FixedAnswer};
use agentdesk::api::{ApiClient, Role, SiteInput, UserId};
use agentdesk::config::{generate_default_config, Config, LoggingConfig};
use agentdesk::dashboard::{month_title, SalesWidget};
use agentdesk::notify::{Notification, Notifier};
use agentdesk::prefs::{FileStore, Preferences, SidebarTheme};
use agentdesk::session::{format_hms, ChangeOutcome, RefreshOutcome, SessionTracker};
use agentdesk::shell::{NavItem, Shell};
use agentdesk::status::{PauseKind, StatusCatalog, StatusStore};

#[derive(Parser)]
#[command(name = "agentdesk")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Call-centre dashboard client: agent status, sales ranking, administration")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: ~/.config/agentdesk/config.toml, then ./agentdesk.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend URL, overrides the config file
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Agent id, overrides the config file
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// Answer yes to every confirmation
    #[arg(short, long, global = true)]
    pub yes: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the current status and per-status durations
    Status,

    /// Change status (key or label, e.g. "pause" or "Déjeuner")
    SetStatus {
        status: String,
        /// Pause kind (short, lunch, training, meeting, other)
        #[arg(short, long)]
        pause: Option<PauseKind>,
    },

    /// Close the open session and clear local state
    Logout,

    /// Monthly sales ranking
    Sales,

    /// Agent administration
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },

    /// Site administration
    Sites {
        #[command(subcommand)]
        action: SitesAction,
    },

    /// UI preferences
    Prefs {
        #[command(subcommand)]
        action: PrefsAction,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum UsersAction {
    /// Show the signed-in profile
    Me,
    /// List agents
    List,
    /// Delete (or deactivate) an agent
    Delete { id: String },
    /// Lock or unlock an agent account
    Toggle { id: String },
}

#[derive(Subcommand)]
pub enum SitesAction {
    List,
    Add { code: String, name: String },
    Edit { id: String, code: String, name: String },
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum PrefsAction {
    Show,
    /// Sidebar theme (blue, blueblack, green, gray)
    Theme { name: String },
    /// on / off
    DarkMode { value: String },
    /// Active page (dashboard, administration, settings)
    Nav { item: NavItem },
}

/// Asks on the terminal
struct StdinConfirm;

#[async_trait]
impl Confirm for StdinConfirm {
    async fn confirm(&self, prompt: &ConfirmPrompt) -> bool {
        println!("{}", prompt.title);
        if let Some(text) = &prompt.text {
            println!("{}", text);
        }
        println!("[{}: o / {}: N]", prompt.confirm_label, prompt.cancel_label);

        let answer = tokio::task::spawn_blocking(|| {
            let mut line = String::new();
            std::io::stdin().read_line(&mut line).map(|_| line)
        })
        .await;

        matches!(
            answer,
            Ok(Ok(line)) if matches!(line.trim().to_lowercase().as_str(), "o" | "oui" | "y" | "yes")
        )
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
    if let Some(user) = &cli.user {
        config.agent.user_id = Some(UserId::new(user.as_str()));
    }

    init_logging(&config.logging);

    if let Commands::Config { output } = &cli.command {
        let content = generate_default_config();
        match output {
            Some(path) => {
                std::fs::write(path, content)
                    .with_context(|| format!("Failed to write {:?}", path))?;
                println!("Config written to {:?}", path);
            }
            None => print!("{}", content),
        }
        return Ok(());
    }

    let client = ApiClient::new(config.to_client_config())?;
    let notifier = Notifier::new();
    let mut toasts = notifier.subscribe();
    let confirm: Arc<dyn Confirm> = if cli.yes {
        Arc::new(FixedAnswer(true))
    } else {
        Arc::new(StdinConfirm)
    };

    let tracker = Arc::new(SessionTracker::new(
        Arc::new(client.clone()),
        StatusCatalog::default(),
        Arc::new(StatusStore::new()),
        notifier.clone(),
        config.user_id().cloned(),
    ));

    match cli.command {
        Commands::Status => {
            if tracker.user_id().is_none() {
                eprintln!("No agent configured. Set [agent] user_id or AGENTDESK_USER_ID.");
                std::process::exit(1);
            }
            let outcome = tracker.refresh_current().await;
            if outcome == RefreshOutcome::Failed {
                eprintln!("Failed to fetch the live session");
                std::process::exit(1);
            }
            print_status(&tracker).await;
        }

        Commands::SetStatus { status, pause } => {
            let label = match tracker.catalog().resolve(&status) {
                Some(entry) => entry.label.clone(),
                None => {
                    eprintln!("Unknown status: {}", status);
                    print_catalog(tracker.catalog());
                    std::process::exit(1);
                }
            };

            let outcome = tracker.change_status(&label, pause).await;
            drain(&mut toasts);
            match outcome {
                ChangeOutcome::StartFailed => std::process::exit(1),
                ChangeOutcome::LocalOnly => println!("Status set to {} (not saved: no agent)", label),
                ChangeOutcome::Persisted(_) => print_status(&tracker).await,
            }
        }

        Commands::Logout => {
            tracker.logout().await;
            println!("Logged out");
        }

        Commands::Sales => {
            let mut widget = SalesWidget::new();
            if !widget.load(&client).await {
                eprintln!("Failed to load monthly sales");
                std::process::exit(1);
            }
            println!("{}", month_title(Local::now()));
            println!("{}", "-".repeat(40));
            for line in widget.ranking_lines() {
                println!("{}", line);
            }
        }

        Commands::Users { action } => {
            let mut panel = AdminPanel::new(client, notifier.clone(), confirm);
            load_panel(&mut panel, &mut toasts).await;

            match action {
                UsersAction::Me => print_profile(&panel),
                UsersAction::List => {
                    if !panel.can_manage_agents() {
                        eprintln!("Agent management requires an Admin account");
                        std::process::exit(1);
                    }
                    print_agents(&panel);
                }
                UsersAction::Delete { id } => {
                    let outcome = panel.delete_agent(&UserId::new(id)).await;
                    finish(outcome, &mut toasts);
                }
                UsersAction::Toggle { id } => {
                    let outcome = panel.toggle_agent_active(&UserId::new(id)).await;
                    finish(outcome, &mut toasts);
                }
            }
        }

        Commands::Sites { action } => {
            let mut panel = AdminPanel::new(client, notifier.clone(), confirm);
            load_panel(&mut panel, &mut toasts).await;

            match action {
                SitesAction::List => {
                    if !panel.can_manage_sites() {
                        eprintln!("Site management requires a SuperAdmin account");
                        std::process::exit(1);
                    }
                    println!("{:<6} | {:<8} | {}", "ID", "Code", "Name");
                    println!("{}", "-".repeat(40));
                    for site in panel.sites() {
                        println!("{:<6} | {:<8} | {}", site.id_segment(), site.code, site.name);
                    }
                }
                SitesAction::Add { code, name } => {
                    let outcome = panel.add_site(&SiteInput { code, name }).await;
                    finish(outcome, &mut toasts);
                }
                SitesAction::Edit { id, code, name } => {
                    let outcome = panel.edit_site(&id, &SiteInput { code, name }).await;
                    finish(outcome, &mut toasts);
                }
                SitesAction::Delete { id } => {
                    let outcome = panel.delete_site(&id).await;
                    finish(outcome, &mut toasts);
                }
            }
        }

        Commands::Prefs { action } => {
            let store = FileStore::open(config.preferences_path())?;
            let prefs = Preferences::load(Box::new(store))?;

            match action {
                PrefsAction::Show => {
                    let current = prefs.current();
                    println!(
                        "Sidebar theme: {} ({})",
                        current.sidebar_theme,
                        current.sidebar_theme.label()
                    );
                    println!("Dark mode:     {}", if current.dark_mode { "on" } else { "off" });
                    println!("Active page:   {}", current.active_item);
                }
                PrefsAction::Theme { name } => {
                    let theme: SidebarTheme = name.parse()?;
                    prefs.set_sidebar_theme(theme)?;
                    println!("Sidebar theme set to {}", theme);
                }
                PrefsAction::DarkMode { value } => {
                    let enabled = match value.trim().to_lowercase().as_str() {
                        "on" | "true" | "dark" => true,
                        "off" | "false" | "light" => false,
                        other => anyhow::bail!("Expected on or off, got {}", other),
                    };
                    prefs.set_dark_mode(enabled)?;
                    println!("Dark mode {}", if enabled { "on" } else { "off" });
                }
                PrefsAction::Nav { item } => {
                    let role = users::fetch_current_user(&client)
                        .await
                        .map(|u| u.role)
                        .unwrap_or_else(|e| {
                            tracing::warn!(error = %e, "Profile unavailable, assuming agent");
                            Role::Agent
                        });
                    let shell = Shell::new(prefs, tracker, role);
                    let active = shell.select(item)?;
                    println!("Active page: {}", active);
                }
            }
        }

        Commands::Config { .. } => unreachable!("handled before the client is built"),
    }

    Ok(())
}

fn init_logging(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("agentdesk={}", logging.level)),
    );

    if logging.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Print every pending notification
fn drain(toasts: &mut broadcast::Receiver<Notification>) {
    while let Ok(toast) = toasts.try_recv() {
        println!("{}", toast);
    }
}

async fn load_panel(panel: &mut AdminPanel, toasts: &mut broadcast::Receiver<Notification>) {
    if let Err(e) = panel.load().await {
        drain(toasts);
        eprintln!("{}", e);
        std::process::exit(1);
    }
    drain(toasts);
}

fn finish<T>(
    outcome: Result<ActionOutcome<T>, agentdesk::admin::AdminError>,
    toasts: &mut broadcast::Receiver<Notification>,
) {
    drain(toasts);
    match outcome {
        Ok(ActionOutcome::Done(_)) => {}
        Ok(ActionOutcome::Cancelled) => println!("Cancelled"),
        Ok(ActionOutcome::Failed) => std::process::exit(1),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

async fn print_status(tracker: &SessionTracker) {
    let state = tracker.state().await;
    let status = tracker.store().current();
    println!("Status: {}", status.as_deref().unwrap_or("-"));

    if let Some(session) = &state.current_session {
        let started = session
            .start_time
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "?".to_string());
        println!(
            "Current session: {} (started {}, {})",
            session.status,
            started,
            format_hms(session.elapsed_secs(Utc::now()))
        );
    }

    if state.timers.is_empty() {
        return;
    }
    println!();
    println!("{:<14} | {:>10}", "Status", "Duration");
    println!("{}", "-".repeat(27));
    for entry in tracker.catalog().entries() {
        if let Some(secs) = state.timers.get(&entry.key) {
            println!("{:<14} | {:>10}", entry.label, format_hms(*secs));
        }
    }
}

fn print_catalog(catalog: &StatusCatalog) {
    println!("Known statuses:");
    for entry in catalog.entries() {
        println!("  {:<10} {}", entry.key, entry.label);
    }
}

fn print_profile(panel: &AdminPanel) {
    let Some(user) = panel.current_user() else {
        return;
    };
    println!("{}", user.display_name().unwrap_or_default());
    println!("Email:   {}", user.email.as_deref().unwrap_or("-"));
    println!("Role:    {}", user.role);
    println!("Profile: {}", user.profil.as_deref().unwrap_or("-"));
    println!("Site:    {}", user.site_name.as_deref().unwrap_or("-"));
    if let Some(created) = user.created_at {
        println!("Since:   {}", created.with_timezone(&Local).format("%d/%m/%Y"));
    }
}

fn print_agents(panel: &AdminPanel) {
    println!(
        "{:<6} | {:<4} | {:<24} | {:<10} | {:<8} | {}",
        "ID", "", "Name", "Role", "Active", "Site"
    );
    println!("{}", "-".repeat(72));
    for agent in panel.agents() {
        let site = agent
            .site_id
            .as_ref()
            .and_then(|id| match id {
                serde_json::Value::String(s) => panel.site_badge(s),
                other => panel.site_badge(&other.to_string()),
            })
            .map(|b| b.name.clone())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<6} | {:<4} | {:<24} | {:<10} | {:<8} | {}",
            agent.id,
            agent.initials(),
            agent.display_name().unwrap_or_default(),
            agent.role,
            if agent.is_active() { "Actif" } else { "Inactif" },
            site
        );
    }
}
