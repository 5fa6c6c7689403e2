use anyhow::{Context, Result, bail};
use tokio::{
    io::{self, AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader},
    net::TcpStream,
    select,
};
use tracing::{info, warn};

use crate::{
    cli::ClientArgs,
    frame::{LINE_ENDINGS, read_frame, write_frame},
    message::validate_name,
};

/// Connects to the server and relays `input` lines until either side finishes.
pub async fn run<I>(args: ClientArgs, input: &mut I) -> Result<()>
where
    I: AsyncBufRead + Unpin,
{
    let stream = TcpStream::connect(args.server)
        .await
        .with_context(|| format!("failed to connect to {}", args.server))?;
    info!("connected to {}", args.server);

    let mut stdout = tokio::io::stdout();
    write_line(&mut stdout, &format!("*** connected to {}", args.server)).await?;

    run_session(stream, &args.name, input, &mut stdout).await
}

/// Registers `name`, then sends every non-empty input line verbatim while
/// printing whatever the server forwards.
///
/// Lines are expected to look like `destination:content`; nothing is checked
/// here. When input runs out the write half is shut down and inbound payloads
/// are still printed until the server closes the stream.
pub async fn run_session<S, I, O>(
    stream: S,
    name: &str,
    input: &mut I,
    output: &mut O,
) -> Result<()>
where
    S: AsyncRead + AsyncWrite,
    I: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin,
{
    if let Err(reason) = validate_name(name) {
        bail!("invalid display name {name:?}: {reason}");
    }

    let (reader, mut writer) = tokio::io::split(stream);
    let mut reader = BufReader::new(reader);

    write_frame(&mut writer, name)
        .await
        .context("failed to send display name")?;

    let receive = receive_loop(&mut reader, output);
    let send = send_loop(input, &mut writer);
    tokio::pin!(receive, send);

    select! {
        received = &mut receive => received,
        sent = &mut send => {
            sent?;
            receive.await
        }
    }
}

async fn receive_loop<R, O>(reader: &mut R, output: &mut O) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin,
{
    while let Some(payload) = read_frame(reader)
        .await
        .context("failed to read from server")?
    {
        write_line(output, &payload).await?;
    }

    write_line(output, "*** server closed the connection").await?;
    Ok(())
}

async fn send_loop<I, W>(input: &mut I, writer: &mut W) -> Result<()>
where
    I: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = String::new();
    loop {
        line.clear();
        if input.read_line(&mut line).await? == 0 {
            break;
        }

        let text = line.trim_end_matches(LINE_ENDINGS);
        if text.is_empty() {
            continue;
        }

        write_frame(writer, text)
            .await
            .context("failed to send message")?;
    }

    if let Err(error) = writer.shutdown().await {
        warn!(?error, "failed to shutdown client writer cleanly");
    }
    Ok(())
}

async fn write_line<O>(output: &mut O, line: &str) -> io::Result<()>
where
    O: AsyncWrite + Unpin,
{
    output.write_all(line.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await
}
