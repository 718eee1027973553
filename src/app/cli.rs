use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(
    about = env!("CARGO_PKG_DESCRIPTION"),
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Args {
    /// Path to the JSON configuration file.
    #[arg(long, default_value = "nftmarketd.json")]
    pub config: PathBuf,

    /// Override the JSON-RPC listen address from the config file.
    #[arg(long)]
    pub rpc_addr: Option<String>,
}
