use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "gatepass",
    about = "Gatepass: signed ticket receipts and PIN redemption at the gate",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the Gatepass HTTP server
    Serve(ServeArgs),
    /// Check a receipt against order data offline
    Verify(VerifyArgs),
    /// Print the canonical SHA-256 digest of a JSON document
    Digest(DigestArgs),
    /// Print the redemption token for an owner and PIN
    Token(TokenArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Override the configured listen address
    #[arg(long)]
    pub bind: Option<SocketAddr>,
}

#[derive(Args)]
pub struct VerifyArgs {
    /// JSON file holding the original order data (`-` for stdin)
    #[arg(long)]
    pub data: PathBuf,
    /// JSON receipt file with `publicKey` and `digitalSignature`
    #[arg(long, conflicts_with_all = ["public_key", "signature"])]
    pub receipt: Option<PathBuf>,
    /// PEM file holding the public key
    #[arg(long, requires = "signature")]
    pub public_key: Option<PathBuf>,
    /// Base64 signature
    #[arg(long, requires = "public_key")]
    pub signature: Option<String>,
}

#[derive(Args)]
pub struct DigestArgs {
    /// JSON file to digest (`-` for stdin)
    #[arg(long)]
    pub data: PathBuf,
}

#[derive(Args)]
pub struct TokenArgs {
    #[arg(long)]
    pub owner: String,
    #[arg(long)]
    pub pin: String,
}
