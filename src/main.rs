use anyhow::Result;
use clap::Parser;
use packlab::commands::{self, loaders, mods, sources};
use packlab::resolution::Strategy;
use packlab::runtime::{AssumeYes, RealRuntime, Runtime};
use std::path::PathBuf;

/// packlab - modpack version constraint resolver
///
/// Create and maintain a packlab.yml describing a Minecraft modpack: the game
/// versions it targets, the mod loaders and the versions bound to them, and
/// the mods it includes with their version ranges.
///
/// If the CURSEFORGE_API_KEY environment variable is set, it is sent with
/// CurseForge requests.
///
/// Examples:
///   packlab init                     # Create packlab.yml in the current directory
///   packlab mods add sodium@^0.5.0   # Add a mod with a version range
///   packlab retarget 1.20.4          # Move the pack to another game version
#[derive(Parser, Debug)]
#[command(author, version = env!("PACKLAB_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Pack directory (defaults to the current directory; also via PACKLAB_DIR)
    #[arg(
        long = "dir",
        short = 'C',
        env = "PACKLAB_DIR",
        value_name = "PATH",
        global = true
    )]
    pub pack_dir: Option<PathBuf>,

    /// Answer yes to every confirmation
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// How loader versions are chosen: manual, latest, or interactive
    #[arg(long, value_name = "STRATEGY", global = true)]
    pub strategy: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Create a new packlab.yml
    Init,

    /// Bump the pack version
    Version(VersionArgs),

    /// Re-resolve loader versions and re-check every mod
    Update,

    /// Point the pack at a single game version
    Retarget(RetargetArgs),

    /// Manage mod sources
    #[command(subcommand)]
    Sources(SourcesCommand),

    /// Manage mod loaders
    #[command(subcommand)]
    Loaders(LoadersCommand),

    /// Manage mods
    #[command(subcommand)]
    Mods(ModsCommand),
}

#[derive(clap::Args, Debug)]
pub struct VersionArgs {
    /// Which part to increment: major, minor, or patch
    #[arg(value_name = "BUMP_TYPE")]
    pub bump_type: String,
}

#[derive(clap::Args, Debug)]
pub struct RetargetArgs {
    /// Game version to target, e.g. 1.20.4
    #[arg(value_name = "GAME_VERSION")]
    pub game_version: String,
}

#[derive(clap::Subcommand, Debug)]
enum SourcesCommand {
    /// List mod sources
    List,
    /// Enable a mod source
    Add {
        #[arg(value_name = "SOURCE")]
        source: String,
    },
    /// Disable a mod source
    Remove {
        #[arg(value_name = "SOURCE")]
        source: String,
    },
}

#[derive(clap::Subcommand, Debug)]
enum LoadersCommand {
    /// List mod loaders and their bound versions
    List,
    /// Enable a mod loader and bind its versions
    Add {
        #[arg(value_name = "LOADER")]
        loader: String,
    },
    /// Disable a mod loader
    Remove {
        #[arg(value_name = "LOADER")]
        loader: String,
    },
}

#[derive(clap::Subcommand, Debug)]
enum ModsCommand {
    /// List the mods in the pack
    List {
        /// List the mods a source offers instead
        #[arg(long)]
        available: bool,

        /// Source to browse with --available
        #[arg(long, value_name = "SOURCE")]
        source: Option<String>,
    },
    /// Add a mod, as "id" or "id@range" (asked for when omitted)
    Add {
        #[arg(value_name = "ID[@RANGE]")]
        specifier: Option<String>,

        /// Source providing the mod
        #[arg(long, value_name = "SOURCE")]
        source: Option<String>,
    },
    /// Remove a mod
    Remove {
        #[arg(value_name = "ID")]
        id: String,
    },
    /// Change the range of a mod; a bare id pins its newest compatible release
    Update {
        #[arg(value_name = "ID[@RANGE]")]
        specifier: String,
    },
}

async fn dispatch<R: Runtime>(
    runtime: R,
    command: Commands,
    pack_dir: Option<PathBuf>,
    strategy: Option<Strategy>,
) -> Result<()> {
    match command {
        Commands::Init => commands::init(runtime, pack_dir, strategy).await,
        Commands::Version(args) => commands::version(runtime, pack_dir, &args.bump_type),
        Commands::Update => commands::update(runtime, pack_dir, strategy).await,
        Commands::Retarget(args) => {
            commands::retarget(runtime, pack_dir, &args.game_version, strategy).await
        }
        Commands::Sources(SourcesCommand::List) => sources::list(runtime, pack_dir),
        Commands::Sources(SourcesCommand::Add { source }) => {
            sources::add(runtime, pack_dir, &source)
        }
        Commands::Sources(SourcesCommand::Remove { source }) => {
            sources::remove(runtime, pack_dir, &source)
        }
        Commands::Loaders(LoadersCommand::List) => loaders::list(runtime, pack_dir),
        Commands::Loaders(LoadersCommand::Add { loader }) => {
            loaders::add(runtime, pack_dir, &loader, strategy).await
        }
        Commands::Loaders(LoadersCommand::Remove { loader }) => {
            loaders::remove(runtime, pack_dir, &loader)
        }
        Commands::Mods(ModsCommand::List { available, source }) => {
            mods::list(runtime, pack_dir, available, source).await
        }
        Commands::Mods(ModsCommand::Add { specifier, source }) => {
            mods::add(runtime, pack_dir, specifier.as_deref(), source).await
        }
        Commands::Mods(ModsCommand::Remove { id }) => mods::remove(runtime, pack_dir, &id),
        Commands::Mods(ModsCommand::Update { specifier }) => {
            mods::update(runtime, pack_dir, &specifier).await
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let strategy = cli
        .strategy
        .as_deref()
        .map(str::parse::<Strategy>)
        .transpose()?;

    if cli.yes {
        dispatch(AssumeYes(RealRuntime), cli.command, cli.pack_dir, strategy).await
    } else {
        dispatch(RealRuntime, cli.command, cli.pack_dir, strategy).await
    }
}
