use clap::Parser;
use error_stack::Result;
use thiserror::Error;

mod client;
mod server;

#[derive(Debug, Error)]
#[error("Command failed")]
pub struct RunError;

/// Command line options for the forum suite: the API server plus a
/// terminal client speaking the same wire contract.
#[derive(Debug, Parser)]
#[command(about = "Utility suite for the agora forum backend", version, author)]
pub struct Cli {
    /// Base URL the client subcommands talk to.
    #[clap(long, global = true, default_value = "http://localhost:3000")]
    pub base_url: String,

    /// Where the client keeps its signed-in session.
    #[clap(long, global = true, default_value = ".agora-session.json")]
    pub session_file: std::path::PathBuf,

    #[clap(subcommand)]
    pub subcommand: Subcommand,
}

#[derive(Debug, Parser)]
pub enum Subcommand {
    /// Expose the forum API HTTP server
    Server(self::server::ServerCommand),

    /// Create an account
    Register(self::client::RegisterCommand),
    /// Sign in and persist the session
    Login(self::client::LoginCommand),
    /// Drop the persisted session
    Logout,
    /// Show the public board
    Posts,
    /// Show the member board
    Members,
    /// Submit a post for review (requires sign-in)
    Publish(self::client::PublishCommand),
    /// Upload a file (requires sign-in)
    Upload(self::client::UploadCommand),
}

impl Cli {
    pub fn run(self) -> Result<(), RunError> {
        let Cli {
            base_url,
            session_file,
            subcommand,
        } = self;

        match subcommand {
            Subcommand::Server(args) => self::server::run(&args),
            command => self::client::run(&base_url, &session_file, command),
        }
    }
}
