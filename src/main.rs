//! Socket Client CLI - talk to an echo endpoint or a STOMP broker.
//!
//! This is the main binary entry point. See the `socket_client` library
//! for the adapters and facade.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use socket_client::{
    adapter::DEFAULT_SOCKET_URL, echo::EchoServer, Config, LoggingPlugin, Plugged,
    Plugin, SocketAdapter, StompClient, WebSocketClient,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Notify;

/// How long `publish` waits for the broker to acknowledge the disconnect.
const FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

// CLI
#[derive(Parser)]
#[command(name = "socket-client")]
#[command(version)]
#[command(about = "Real-time messaging over a raw WebSocket or a STOMP broker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the echo server
    Serve {
        /// Port to listen on
        #[arg(long, default_value_t = 8010)]
        port: u16,
    },
    /// Open a raw socket; stdin lines are sent, messages are printed
    Connect {
        /// Endpoint URL (defaults to the configured socket URL)
        #[arg(long)]
        url: Option<String>,
        /// Log every lifecycle hook
        #[arg(long)]
        log_hooks: bool,
    },
    /// Subscribe to broker topics and print every publication
    Listen {
        /// Topic to subscribe to (repeatable)
        #[arg(long = "topic", required = true)]
        topics: Vec<String>,
        /// Broker URL (defaults to the configured broker URL)
        #[arg(long)]
        broker_url: Option<String>,
    },
    /// Publish one message to a broker topic
    Publish {
        /// Destination topic
        #[arg(long)]
        topic: String,
        /// Message body
        #[arg(long)]
        message: String,
        /// Broker URL (defaults to the configured broker URL)
        #[arg(long)]
        broker_url: Option<String>,
    },
}

async fn run_serve(port: u16) -> Result<()> {
    let server = EchoServer::bind(("0.0.0.0", port)).await?;
    println!("Echo server running at ws://localhost:{port}");
    tokio::select! {
        () = server.run() => {}
        _ = tokio::signal::ctrl_c() => println!("Shutting down..."),
    }
    Ok(())
}

async fn run_connect(config: &Config, url: Option<String>, log_hooks: bool) -> Result<()> {
    let url = url.unwrap_or_else(|| config.socket_url.clone());
    if url != DEFAULT_SOCKET_URL {
        log::info!("Using socket URL {}", url);
    }

    let plugins: Vec<Box<dyn Plugin>> = if log_hooks {
        vec![Box::new(LoggingPlugin)]
    } else {
        Vec::new()
    };
    let mut client = WebSocketClient::new(Plugged::new(SocketAdapter::new(url.clone()), plugins));

    let closed = Arc::new(Notify::new());
    client.on_message(|msg| println!("< {msg}"));
    client.on_error(|err| eprintln!("! {err}"));
    {
        let closed = Arc::clone(&closed);
        client.on_close(move |info| {
            println!("Connection closed ({} {})", info.code, info.reason);
            closed.notify_one();
        });
    }

    client
        .connect()
        .await
        .with_context(|| format!("Failed to connect to {url}"))?;
    println!("Connected to {url}. Type messages, Ctrl-C to quit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) if !line.is_empty() => client.send(&line)?,
                Some(_) => {}
                None => break,
            },
            () = closed.notified() => return Ok(()),
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    client.disconnect();
    let _ = tokio::time::timeout(FLUSH_TIMEOUT, closed.notified()).await;
    Ok(())
}

fn stomp_client(config: &Config, broker_url: Option<String>) -> StompClient {
    let mut broker = config.broker.clone();
    if let Some(url) = broker_url {
        broker.broker_url = url;
    }
    let client = StompClient::stomp(broker);
    client.on_error(|err| log::error!("{}", err));
    client
}

async fn run_listen(config: &Config, topics: &[String], broker_url: Option<String>) -> Result<()> {
    let mut client = stomp_client(config, broker_url);
    client.on_connect(|| log::info!("Broker session established"));
    client.on_close(|info| log::warn!("Broker connection ended ({})", info.code));

    client.connect().await.context("Failed to connect to broker")?;
    client.subscribe(topics, |body| println!("{body}"))?;
    println!("Listening on {}. Ctrl-C to quit.", topics.join(", "));

    tokio::signal::ctrl_c().await?;
    client.disconnect();
    Ok(())
}

async fn run_publish(
    config: &Config,
    topic: &str,
    message: &str,
    broker_url: Option<String>,
) -> Result<()> {
    let mut client = stomp_client(config, broker_url);
    client.connect().await.context("Failed to connect to broker")?;
    client.publish(topic, message)?;

    let closed = Arc::new(Notify::new());
    {
        let closed = Arc::clone(&closed);
        client.on_close(move |_| closed.notify_one());
    }
    client.disconnect();
    if tokio::time::timeout(FLUSH_TIMEOUT, closed.notified()).await.is_err() {
        log::warn!("Broker did not close within {}s", FLUSH_TIMEOUT.as_secs());
    }
    println!("Published to {topic}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => run_serve(port).await,
        Commands::Connect { url, log_hooks } => {
            let config = Config::load()?;
            run_connect(&config, url, log_hooks).await
        }
        Commands::Listen { topics, broker_url } => {
            let config = Config::load()?;
            run_listen(&config, &topics, broker_url).await
        }
        Commands::Publish {
            topic,
            message,
            broker_url,
        } => {
            let config = Config::load()?;
            run_publish(&config, &topic, &message, broker_url).await
        }
    }
}
