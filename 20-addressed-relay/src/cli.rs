use std::net::SocketAddr;

use clap::{Args, Parser, Subcommand};

use crate::message::validate_name;

pub const DEFAULT_ADDR: &str = "127.0.0.1:9000";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Omit to be asked interactively.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Run the relay server, routing `destination:content` lines between named clients.
    Server(ServerArgs),
    /// Connect to a relay server under a display name.
    Client(ClientArgs),
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct ServerArgs {
    /// Socket address the server should bind to. Use port 0 for an ephemeral port.
    #[arg(long, default_value = DEFAULT_ADDR)]
    pub listen: SocketAddr,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct ClientArgs {
    /// Display name other clients use to address you.
    #[arg(long, value_parser = parse_name)]
    pub name: String,

    /// Address of the relay server.
    #[arg(long, default_value = DEFAULT_ADDR)]
    pub server: SocketAddr,
}

fn parse_name(value: &str) -> Result<String, String> {
    validate_name(value)
        .map(|()| value.to_string())
        .map_err(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_client_subcommand() {
        let cli = Cli::try_parse_from(["relay", "client", "--name", "alice"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Client(ClientArgs {
                name: "alice".into(),
                server: DEFAULT_ADDR.parse().unwrap(),
            }))
        );
    }

    #[test]
    fn server_subcommand_defaults_listen_address() {
        let cli = Cli::try_parse_from(["relay", "server"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Server(ServerArgs {
                listen: DEFAULT_ADDR.parse().unwrap(),
            }))
        );
    }

    #[test]
    fn subcommand_is_optional() {
        let cli = Cli::try_parse_from(["relay"]).unwrap();
        assert_eq!(cli.command, None);
    }

    #[test]
    fn client_requires_name() {
        assert!(Cli::try_parse_from(["relay", "client"]).is_err());
    }

    #[test]
    fn client_rejects_blank_or_multiline_name() {
        for name in ["", "   ", "alice\nbob:hi"] {
            let err = Cli::try_parse_from(["relay", "client", "--name", name]).unwrap_err();
            assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
        }
    }
}
