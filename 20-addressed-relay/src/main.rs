use anyhow::Result;
use clap::Parser;
use tokio::io::BufReader;
use tracing::{info, warn};

use addressed_relay::{
    cli::{Cli, Command},
    client, prompt,
    server::Server,
};

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(run(cli));
    // A pending stdin read sits on a blocking thread that cannot be cancelled.
    runtime.shutdown_background();
    result
}

async fn run(cli: Cli) -> Result<()> {
    let mut stdin = BufReader::new(tokio::io::stdin());
    let command = match cli.command {
        Some(command) => command,
        None => prompt::ask_command(&mut stdin, &mut tokio::io::stdout()).await?,
    };

    match command {
        Command::Server(args) => {
            let server = Server::bind(args.listen).await?;
            let addr = server.local_addr()?;
            info!("server listening on {}", addr);
            if let Err(err) = server.run_until_ctrl_c().await {
                warn!("server exited with error: {err:?}");
                return Err(err);
            }
        }
        Command::Client(args) => client::run(args, &mut stdin).await?,
    }

    Ok(())
}
