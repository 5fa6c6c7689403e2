use std::net::{IpAddr, SocketAddr};

use anyhow::{Context, Result, bail};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::{
    cli::{ClientArgs, Command, ServerArgs},
    frame::LINE_ENDINGS,
    message::validate_name,
};

/// Asks which mode to run in and collects its settings, one answer per line.
pub async fn ask_command<I, O>(input: &mut I, output: &mut O) -> Result<Command>
where
    I: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin,
{
    let mode = ask(input, output, "Run as server (s) or client (c)? ").await?;

    match mode.to_ascii_lowercase().as_str() {
        "s" => {
            let listen = ask_addr(input, output).await?;
            Ok(Command::Server(ServerArgs { listen }))
        }
        "c" => {
            let name = ask(input, output, "Display name: ").await?;
            if let Err(reason) = validate_name(&name) {
                bail!(reason);
            }
            let server = ask_addr(input, output).await?;
            Ok(Command::Client(ClientArgs { name, server }))
        }
        other => bail!("invalid option '{other}', expected 's' or 'c'"),
    }
}

async fn ask_addr<I, O>(input: &mut I, output: &mut O) -> Result<SocketAddr>
where
    I: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin,
{
    let ip = ask(input, output, "Server IP: ").await?;
    let ip: IpAddr = ip
        .parse()
        .with_context(|| format!("invalid IP address '{ip}'"))?;

    let port = ask(input, output, "Server port: ").await?;
    let port: u16 = port
        .parse()
        .with_context(|| format!("invalid port '{port}'"))?;

    Ok(SocketAddr::new(ip, port))
}

async fn ask<I, O>(input: &mut I, output: &mut O, question: &str) -> Result<String>
where
    I: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin,
{
    output.write_all(question.as_bytes()).await?;
    output.flush().await?;

    let mut answer = String::new();
    if input.read_line(&mut answer).await? == 0 {
        bail!("input closed while waiting for an answer");
    }
    Ok(answer.trim_end_matches(LINE_ENDINGS).trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn answer(lines: &str) -> (Result<Command>, String) {
        let mut input = lines.as_bytes();
        let mut output = Vec::new();
        let command = ask_command(&mut input, &mut output).await;
        (command, String::from_utf8(output).unwrap())
    }

    #[tokio::test]
    async fn collects_server_settings() {
        let (command, transcript) = answer("S\n127.0.0.1\n9000\n").await;

        assert_eq!(
            command.unwrap(),
            Command::Server(ServerArgs {
                listen: "127.0.0.1:9000".parse().unwrap(),
            })
        );
        assert_eq!(
            transcript,
            "Run as server (s) or client (c)? Server IP: Server port: "
        );
    }

    #[tokio::test]
    async fn collects_client_settings_name_first() {
        let (command, transcript) = answer("c\r\nalice\r\n::1\r\n4000\r\n").await;

        assert_eq!(
            command.unwrap(),
            Command::Client(ClientArgs {
                name: "alice".into(),
                server: "[::1]:4000".parse().unwrap(),
            })
        );
        assert!(transcript.contains("Display name: Server IP: "));
    }

    #[tokio::test]
    async fn rejects_unknown_mode() {
        let (command, _) = answer("x\n").await;
        assert!(command.unwrap_err().to_string().contains("invalid option"));
    }

    #[tokio::test]
    async fn rejects_blank_name() {
        let (command, _) = answer("c\n   \n127.0.0.1\n9000\n").await;
        assert!(command.unwrap_err().to_string().contains("cannot be empty"));
    }

    #[tokio::test]
    async fn rejects_bad_port() {
        let (command, _) = answer("s\n127.0.0.1\n70000\n").await;
        assert!(command.unwrap_err().to_string().contains("invalid port"));
    }

    #[tokio::test]
    async fn fails_when_input_ends_early() {
        let (command, _) = answer("c\n").await;
        assert!(command.is_err());
    }
}
