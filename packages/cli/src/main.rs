use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;

mod config;
mod upload;

#[derive(Parser)]
#[command(name = "stash", version, about = "Upload local files to a Stash server")]
struct Cli {
    /// Print debug-level progress information.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload local files to the server's file store
    Upload(upload::UploadArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    match cli.command {
        Command::Upload(args) => {
            let settings = config::ConnectionSettings::resolve(&args.connection)?;
            let session = stash_client::HttpSession::connect(settings.server, settings.token)?;
            let outcome = upload::run(&session, &args)?;
            println!("{outcome}");
        }
    }

    Ok(())
}
