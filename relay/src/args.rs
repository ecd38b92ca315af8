use std::net::SocketAddr;

use clap::Parser;

/// Bedrock text-generation relay
#[derive(Debug, Parser)]
#[command(name = "relay", about = "Relay generation requests to AWS Bedrock")]
pub struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8080", env = "RELAY_LISTEN")]
    pub listen: SocketAddr,
}
