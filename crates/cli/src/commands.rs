//! CLI commands

use anyhow::{Context, Result};
use clap::Subcommand;
use collab_core::types::{LoginRequest, ProjectQuery, ProjectStatus, RegisterRequest};
use collab_core::{FileStorage, History, Navigator, Role, Session, StateDir, TokenStore};
use collab_frontend_common::{AuthStore, LogoutMode, Router, ToastKind, ToastStore};
use collab_http::ApiClient;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::config;

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and persist the session
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long, env = "COLLAB_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account and sign in
    Register {
        #[arg(long)]
        email: String,

        #[arg(short, long)]
        username: String,

        #[arg(short, long, env = "COLLAB_PASSWORD", hide_env_values = true)]
        password: String,

        /// student, company, committee or admin
        #[arg(long, default_value = "student")]
        role: Role,

        #[arg(long)]
        full_name: Option<String>,
    },

    /// Sign out and forget the stored tokens
    Logout {
        /// Skip revoking the token on the server
        #[arg(long)]
        local: bool,
    },

    /// Show the signed-in user
    Whoami,

    /// Browse projects
    Projects {
        #[command(subcommand)]
        command: ProjectCommands,
    },

    /// Read and acknowledge notifications
    Notifications {
        #[command(subcommand)]
        command: NotificationCommands,
    },

    /// Skill catalogue
    Skills {
        #[command(subcommand)]
        command: SkillCommands,
    },

    /// Chat rooms and live connection details
    Chat {
        #[command(subcommand)]
        command: ChatCommands,
    },

    /// Navigate to a client route and print where the guard lands
    Route { path: String },

    /// Generate a default configuration file
    Config {
        /// Output file path (defaults to the state directory's client.json)
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ProjectCommands {
    /// List projects
    List {
        #[arg(long)]
        page: Option<u32>,

        #[arg(long)]
        size: Option<u32>,

        /// open, in_progress or closed
        #[arg(long)]
        status: Option<ProjectStatus>,

        #[arg(long)]
        owner: Option<i64>,

        #[arg(long)]
        search: Option<String>,
    },

    /// Show one project
    Show { id: i64 },
}

#[derive(Subcommand)]
pub enum NotificationCommands {
    /// List notifications
    List {
        /// Only unread notifications
        #[arg(long)]
        unread: bool,
    },

    /// Mark one notification as read
    Read { id: String },

    /// Mark every notification as read
    ReadAll,
}

#[derive(Subcommand)]
pub enum SkillCommands {
    /// List all skills
    List,
}

#[derive(Subcommand)]
pub enum ChatCommands {
    /// List the rooms you take part in
    Rooms,

    /// Show the messages of a room
    Messages { room: String },

    /// Print the websocket URL for a room
    Url { room: String },
}

/// Everything a command needs, wired to the persisted session
struct App {
    auth: Arc<AuthStore>,
    router: Router,
    toasts: ToastStore,
    history: Arc<History>,
}

impl App {
    fn open(state_dir: &StateDir, config_path: Option<PathBuf>) -> Result<Self> {
        state_dir.create_directories()?;
        let config = config::load_client_config(config_path, state_dir)?;

        let storage = FileStorage::open(state_dir.tokens_path())?;
        let history = Arc::new(History::default());
        let session = Session::new(TokenStore::new(Arc::new(storage)), history.clone())
            .with_routes(config.routes.clone());
        let client = ApiClient::from_config(&config.api, session)?;

        let auth = Arc::new(AuthStore::new(client));
        Ok(Self {
            router: Router::new(auth.clone()),
            auth,
            toasts: ToastStore::new(),
            history,
        })
    }

    fn client(&self) -> &ApiClient {
        self.auth.client()
    }

    /// Print and dismiss pending toasts
    fn flush_toasts(&self) {
        for toast in self.toasts.toasts() {
            match toast.kind {
                ToastKind::Success => println!("{}", toast.message),
                ToastKind::Error => eprintln!("{}", toast.message),
            }
            self.toasts.remove(toast.id);
        }
    }

    /// Load the stored session, failing when there is none
    async fn require_user(&self) -> Result<()> {
        self.auth.fetch_user().await;
        if !self.auth.is_authenticated() {
            anyhow::bail!("Not logged in; run `collab login` first");
        }
        Ok(())
    }
}

impl Commands {
    pub async fn execute(self, state_dir: StateDir, config_path: Option<PathBuf>) -> Result<()> {
        match self {
            Self::Config { output } => {
                let path = output.unwrap_or_else(|| state_dir.config_path());
                config::generate_default_config(&path)?;
                println!("Generated client configuration at: {}", path.display());
                Ok(())
            }
            command => {
                let app = App::open(&state_dir, config_path)?;
                let result = command.run(&app).await;
                app.flush_toasts();
                result
            }
        }
    }

    async fn run(self, app: &App) -> Result<()> {
        match self {
            Self::Login { username, password } => {
                app.auth
                    .login(&LoginRequest { username, password })
                    .await
                    .context("Login failed")?;
                announce_user(app);
                Ok(())
            }
            Self::Register {
                email,
                username,
                password,
                role,
                full_name,
            } => {
                let payload = RegisterRequest {
                    email,
                    username,
                    password,
                    full_name,
                    role,
                };
                app.auth
                    .register(&payload)
                    .await
                    .context("Registration failed")?;
                announce_user(app);
                Ok(())
            }
            Self::Logout { local } => {
                let mode = if local {
                    LogoutMode::LocalOnly
                } else {
                    LogoutMode::Server
                };
                app.auth.logout(mode).await;
                app.toasts.success("Signed out");
                Ok(())
            }
            Self::Whoami => {
                app.require_user().await?;
                if let Some(user) = app.auth.user() {
                    println!("{} <{}>", user.display_name(), user.email);
                    println!("  id:   {}", user.id);
                    println!("  role: {}", user.role);
                    if !user.skills.is_empty() {
                        let skills: Vec<_> = user.skills.iter().map(|s| s.name.as_str()).collect();
                        println!("  skills: {}", skills.join(", "));
                    }
                }
                Ok(())
            }
            Self::Projects { command } => command.execute(app).await,
            Self::Notifications { command } => command.execute(app).await,
            Self::Skills { command } => command.execute(app).await,
            Self::Chat { command } => command.execute(app).await,
            Self::Route { path } => {
                let landed = app.router.push(&path).await?;
                let view = app
                    .router
                    .table()
                    .resolve(&landed)
                    .map(|found| format!("{:?}", found.route.view))
                    .unwrap_or_else(|| "unknown".to_string());
                println!("{landed} ({view})");
                info!(requested = %path, landed = %app.history.current(), "Route evaluated");
                Ok(())
            }
            // handled before a session is opened
            Self::Config { .. } => Ok(()),
        }
    }
}

fn announce_user(app: &App) {
    match app.auth.user() {
        Some(user) => {
            app.toasts
                .success(format!("Signed in as {} ({})", user.display_name(), user.role));
        }
        None => {
            app.toasts
                .error("Signed in, but the profile could not be loaded");
        }
    }
}

impl ProjectCommands {
    async fn execute(self, app: &App) -> Result<()> {
        match self {
            Self::List {
                page,
                size,
                status,
                owner,
                search,
            } => {
                let query = ProjectQuery {
                    page,
                    size,
                    status,
                    owner_id: owner,
                    search,
                    ..ProjectQuery::default()
                };
                let listing = app.client().list_projects(&query).await?;
                for project in &listing.items {
                    println!(
                        "{:>6}  {:<12} {}",
                        project.id,
                        project.status.as_str(),
                        project.title
                    );
                }
                println!(
                    "page {} of {} projects (size {})",
                    listing.page, listing.total, listing.size
                );
                Ok(())
            }
            Self::Show { id } => {
                let project = app.client().get_project(id).await?;
                println!("{} [{}]", project.title, project.status.as_str());
                println!("  owner: {}", project.owner_id);
                println!("  participants: up to {}", project.max_participants);
                if let Some(deadline) = project.deadline {
                    println!("  deadline: {}", deadline.format("%Y-%m-%d"));
                }
                if !project.required_skills.is_empty() {
                    let skills: Vec<_> = project
                        .required_skills
                        .iter()
                        .map(|s| s.name.as_str())
                        .collect();
                    println!("  skills: {}", skills.join(", "));
                }
                println!();
                println!("{}", project.description);
                Ok(())
            }
        }
    }
}

impl NotificationCommands {
    async fn execute(self, app: &App) -> Result<()> {
        app.require_user().await?;
        match self {
            Self::List { unread } => {
                let notifications = app.client().notifications(unread).await?;
                for n in &notifications {
                    let marker = if n.is_read { ' ' } else { '*' };
                    println!("{marker} {}  {}", n.id, n.title);
                    if let Some(message) = &n.message {
                        println!("    {message}");
                    }
                }
                let unread = app.client().unread_count().await?;
                println!("{} unread", unread.count);
                Ok(())
            }
            Self::Read { id } => {
                let notification = app.client().mark_notification_read(&id).await?;
                app.toasts
                    .success(format!("Marked \"{}\" as read", notification.title));
                Ok(())
            }
            Self::ReadAll => {
                app.client().mark_all_notifications_read().await?;
                app.toasts.success("All notifications marked as read");
                Ok(())
            }
        }
    }
}

impl SkillCommands {
    async fn execute(self, app: &App) -> Result<()> {
        match self {
            Self::List => {
                for skill in app.client().skills().await? {
                    match &skill.category {
                        Some(category) => println!("{:>4}  {} ({category})", skill.id, skill.name),
                        None => println!("{:>4}  {}", skill.id, skill.name),
                    }
                }
                Ok(())
            }
        }
    }
}

impl ChatCommands {
    async fn execute(self, app: &App) -> Result<()> {
        app.require_user().await?;
        match self {
            Self::Rooms => {
                for room in app.client().chat_rooms().await? {
                    println!(
                        "{}  {}  {}",
                        room.id,
                        room.project_title,
                        room.last_message.as_deref().unwrap_or("")
                    );
                }
                Ok(())
            }
            Self::Messages { room } => {
                for message in app.client().chat_messages(&room).await? {
                    println!(
                        "[{}] {}: {}",
                        message.created_at.format("%Y-%m-%d %H:%M"),
                        message.sender_name,
                        message.content
                    );
                }
                Ok(())
            }
            Self::Url { room } => {
                println!("{}", app.client().chat_socket_url(&room)?);
                Ok(())
            }
        }
    }
}
