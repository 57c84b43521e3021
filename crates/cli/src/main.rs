mod commands;

use clap::{CommandFactory, Parser};
use clap_complete::{Shell, generate};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "landing-kit")]
#[command(version, about = "Static landing-page generator for local service businesses", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Initialize new site directory
    Init {
        /// Path to site directory
        path: PathBuf,

        /// Brand name used in titles and structured data
        #[arg(long)]
        brand: Option<String>,

        /// Canonical site origin, e.g. https://example.com
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Validate site configuration
    Validate {
        /// Path to site directory
        path: PathBuf,
    },

    /// Generate all landing pages plus the sitemap
    Build {
        /// Path to site directory
        path: PathBuf,

        /// Output directory for generated pages
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Preview a built output directory with hot reload
    Preview {
        /// Path to built output directory
        path: PathBuf,

        /// Port to serve on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Apply maintenance fixes to HTML files under a directory
    Fix {
        #[command(subcommand)]
        command: FixCommand,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser)]
enum FixCommand {
    /// Add loading="lazy" to images outside hero sections
    LazyImages {
        /// Directory to scan for HTML files
        dir: PathBuf,
    },

    /// Add type="module" to local page script tags
    ScriptModules {
        /// Directory to scan for HTML files
        dir: PathBuf,
    },

    /// Re-join img tags broken across stray lines
    ImgTags {
        /// Directory to scan for HTML files
        dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Init {
            path,
            brand,
            base_url,
        } => commands::init::run(path, brand, base_url).await,
        Command::Validate { path } => commands::validate::run(path).await,
        Command::Build { path, output } => commands::build::run(path, output).await,
        Command::Preview { path, port } => commands::preview::run(path, port).await,
        Command::Fix { command } => match command {
            FixCommand::LazyImages { dir } => commands::fix::lazy_images(dir),
            FixCommand::ScriptModules { dir } => commands::fix::script_modules(dir),
            FixCommand::ImgTags { dir } => commands::fix::img_tags(dir),
        },
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "landing-kit", &mut io::stdout());
            Ok(())
        }
    }
}
