use clap::Parser;
use spigot::{
    generator::{self, kinesis},
    signals::Shutdown,
};
use tokio::{runtime::Builder, signal, task::JoinSet, time::Duration};
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, util::SubscriberInitExt};

/// The maximum time to wait for the publish loop to wind down after an
/// interrupt.
const MAX_SHUTDOWN_DELAY: Duration = Duration::from_secs(10);

#[derive(thiserror::Error, Debug)]
enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Spigot generator returned an error: {0}")]
    Generator(#[from] generator::Error),
}

/// Publish synthetic website-interaction events to a Kinesis stream until
/// interrupted.
#[derive(Parser)]
#[clap(version, about, long_about = None)]
struct Cli {}

async fn inner_main() -> Result<(), Error> {
    let shutdown = Shutdown::new();

    // The stream name and region are fixed constants of the tool; the seed
    // alone varies run to run.
    let config = generator::Config::Kinesis(kinesis::Config {
        seed: rand::random(),
        ..kinesis::Config::default()
    });

    let mut gsrv_joinset = JoinSet::new();
    let generator_server = generator::Server::new(config, shutdown.clone());
    gsrv_joinset.spawn(generator_server.run());

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("received ctrl-c");
        },
        Some(res) = gsrv_joinset.join_next() => {
            match res {
                Ok(Ok(())) => { /* Generator shut down on its own */ }
                Ok(Err(err)) => {
                    error!("Generator shut down unexpectedly: {err}");
                    return Err(Error::Generator(err));
                }
                Err(err) => error!("Could not join the spawned generator task: {err}"),
            }
        },
    }

    if shutdown.signal().is_err() {
        debug!("no tasks remained to signal");
    }
    shutdown.wait(MAX_SHUTDOWN_DELAY).await;

    while let Some(res) = gsrv_joinset.join_next().await {
        match res {
            Ok(Ok(())) => { /* Generator shut down successfully */ }
            Ok(Err(err)) => {
                error!("Generator shut down unexpectedly: {err}");
                return Err(Error::Generator(err));
            }
            Err(err) => error!("Could not join the spawned generator task: {err}"),
        }
    }

    Ok(())
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .finish()
        .init();

    let Cli {} = Cli::parse();

    let version = env!("CARGO_PKG_VERSION");
    info!("Starting spigot {version} run.");

    // The publish loop is strictly sequential: one record in flight at a
    // time, paced by its own sleep. A single-threaded runtime matches that.
    let runtime = Builder::new_current_thread().enable_io().enable_time().build()?;
    runtime.block_on(inner_main())
}
