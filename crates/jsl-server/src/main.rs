use clap::Parser;
use jsl_lint::LintConfig;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncReadExt;

mod capture;
mod mcp;
mod server;
mod session;
mod tools;

#[derive(Parser)]
#[command(
    name = "jsl-tools",
    about = "Beautify and lint JavaScript captured from web traffic"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Lint captured scripts and print the results as JSON
    Lint {
        /// Path to the JSON config file
        #[arg(long)]
        config: PathBuf,

        /// JSON-lines file of {"host","url","script"} captures (default: stdin)
        #[arg(long)]
        captures: Option<PathBuf>,
    },
    /// Start the tool server (JSON-RPC over stdio)
    Serve {
        /// Path to the JSON config file
        #[arg(long)]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // All logging goes to stderr so stdout is reserved for JSON output.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Lint { config, captures } => {
            let config = LintConfig::from_file(&config)?;
            let text = match captures {
                Some(path) => tokio::fs::read_to_string(&path).await?,
                None => {
                    let mut text = String::new();
                    tokio::io::stdin().read_to_string(&mut text).await?;
                    text
                }
            };

            let captures = capture::parse_captures(&text);
            tracing::info!("Linting {} captured script(s)", captures.len());

            let session = session::Session::new(&config);
            for c in captures {
                session.submit(c).await;
            }
            session.drain().await;

            println!("{}", serde_json::to_string_pretty(&session.table().snapshot())?);
        }
        Commands::Serve { config } => {
            let config = LintConfig::from_file(&config)?;
            tracing::info!(
                "Starting jsl-tools server (output: {})",
                config.output_dir.display()
            );
            server::run(Arc::new(session::Session::new(&config))).await?;
        }
    }

    Ok(())
}
