//! Command line and environment configuration

use crate::state::ServerConfig;
use clap::Parser;
use std::net::SocketAddr;

#[derive(Parser, Debug)]
#[command(
    name = "duet-server",
    about = "Pairs strangers into 1:1 WebRTC sessions and relays their signaling",
    version
)]
pub struct Args {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:3536", env = "DUET_HOST")]
    pub host: SocketAddr,

    /// Display name for clients that connect without `?name=`
    #[arg(long, default_value = "anonymous", env = "DUET_DEFAULT_NAME")]
    pub default_name: String,

    /// Maximum display name length, in characters
    #[arg(long, default_value_t = 32, env = "DUET_MAX_NAME_LEN")]
    pub max_name_len: usize,

    /// Events buffered per connection; a client that falls further behind
    /// misses events
    #[arg(
        long,
        default_value_t = 64,
        value_parser = clap::value_parser!(u64).range(1..),
        env = "DUET_OUTBOUND_CAPACITY"
    )]
    pub outbound_capacity: u64,
}

impl Args {
    pub fn config(&self) -> ServerConfig {
        ServerConfig {
            default_name: self.default_name.clone(),
            max_name_len: self.max_name_len,
            outbound_capacity: usize::try_from(self.outbound_capacity).unwrap_or(usize::MAX),
        }
    }
}
