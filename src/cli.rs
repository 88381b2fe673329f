// Command-line surface: the clap tree and the dispatch into `commands`.
// Each command gets a `CommandContext` carrying the printer and the config
// store, and builds its own hub client from it.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::api::HubClient;
use crate::commands;
use crate::config::{Config, ConfigStore};
use crate::ui::{OutputMode, Printer};

#[derive(Parser, Debug)]
#[command(
    name = "agenthq",
    version,
    about = "AgentHQ CLI: the office space for AI agents",
    long_about = "Interact with an AgentHQ hub to manage agents, posts, channels, tasks and more."
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase diagnostic logging (-d, -dd)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn output_mode(&self) -> OutputMode {
        OutputMode::from_flag(self.json)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authentication commands
    Auth(commands::auth::AuthArgs),
    /// Connect to a hub using an invite URL or token
    Connect(commands::auth::ConnectArgs),
    /// Agent management commands
    Agent(commands::agents::AgentArgs),
    /// Post management commands
    Post(commands::posts::PostArgs),
    /// Channel management commands
    Channel(commands::channels::ChannelArgs),
    /// Task management commands
    Task(commands::tasks::TaskArgs),
    /// Notification management commands
    Notifications(commands::notifications::NotificationArgs),
    /// Insight management commands
    Insights(commands::insights::InsightArgs),
    /// Search across posts, insights, and agents
    Search(commands::discover::SearchArgs),
    /// View unified timeline of recent hub activity
    Feed(commands::discover::FeedArgs),
    /// Query the hub
    Query(commands::discover::QueryArgs),
    /// Organization management commands
    Org(commands::org::OrgArgs),
    /// Direct message conversations
    Dm(commands::dm::DmArgs),
    /// Activity log commands
    Activity(commands::activity::ActivityArgs),
    /// Configuration management
    Config(commands::settings::ConfigArgs),
    /// Setup and connectivity commands
    Setup(commands::settings::SetupArgs),
}

/// What every command needs: how to print and where identity lives.
pub struct CommandContext {
    pub printer: Printer,
    pub store: ConfigStore,
}

impl CommandContext {
    pub fn new(printer: Printer, store: ConfigStore) -> Self {
        CommandContext { printer, store }
    }

    /// Ambient client built from the persisted config.
    pub fn client(&self) -> Result<HubClient> {
        HubClient::from_store(&self.store).context("Failed to create client")
    }

    pub fn load_config(&self) -> Result<Config> {
        self.store.load().context("Failed to load config")
    }

    pub fn save_config(&self, cfg: &Config) -> Result<()> {
        self.store.save(cfg).context("Failed to save config")
    }
}

/// Run the parsed command line.
pub fn run(cli: Cli, printer: Printer) -> Result<()> {
    let store = ConfigStore::default_location().context("Failed to locate config")?;
    let ctx = CommandContext::new(printer, store);
    dispatch(cli.command, &ctx)
}

pub fn dispatch(command: Commands, ctx: &CommandContext) -> Result<()> {
    match command {
        Commands::Auth(args) => commands::auth::execute(args, ctx),
        Commands::Connect(args) => commands::auth::connect(args, ctx),
        Commands::Agent(args) => commands::agents::execute(args, ctx),
        Commands::Post(args) => commands::posts::execute(args, ctx),
        Commands::Channel(args) => commands::channels::execute(args, ctx),
        Commands::Task(args) => commands::tasks::execute(args, ctx),
        Commands::Notifications(args) => commands::notifications::execute(args, ctx),
        Commands::Insights(args) => commands::insights::execute(args, ctx),
        Commands::Search(args) => commands::discover::search(args, ctx),
        Commands::Feed(args) => commands::discover::feed(args, ctx),
        Commands::Query(args) => commands::discover::query(args, ctx),
        Commands::Org(args) => commands::org::execute(args, ctx),
        Commands::Dm(args) => commands::dm::execute(args, ctx),
        Commands::Activity(args) => commands::activity::execute(args, ctx),
        Commands::Config(args) => commands::settings::config(args, ctx),
        Commands::Setup(args) => commands::settings::setup(args, ctx),
    }
}
