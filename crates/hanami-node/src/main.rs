//! Hanami node entry point.
//!
//! # Usage
//!
//! ```text
//! hanami-node [--config FILE] <COMMAND>
//!
//! Commands:
//!   encode   Write an encoded error-log message to a file
//!   decode   Decode a message file and print it as JSON
//!   inspect  Print the header and entry layout of a message file
//!   listen   Receive error-log messages over TCP
//!   send     Send one error-log message over TCP
//! ```
//!
//! `--config` defaults to `/etc/hanami-node/hanami-node.conf` and can also be
//! set through `HANAMI_CONFIG`.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use hanami_core::identity::is_uuid;
use hanami_core::protocol::inspect;
use hanami_core::{
    generate_uuid, is_hanami_protocol, ErrorLogMessage, ErrorSink, HanamiMessage, MessageHeader,
    MessageKind, TracingErrorSink,
};
use hanami_node::bootstrap::initialize;
use hanami_node::network::{send_message, serve};

/// Process name: log file stem and default config location.
const NAME: &str = "hanami-node";

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Sends, receives and inspects Hanami error-log messages.
#[derive(Debug, Parser)]
#[command(name = "hanami-node", version)]
struct Cli {
    /// Config file (default: /etc/hanami-node/hanami-node.conf).
    #[arg(long, global = true, env = "HANAMI_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write an encoded error-log message to a file.
    Encode {
        #[command(flatten)]
        message: MessageArgs,
        /// Output file.
        #[arg(long)]
        out: PathBuf,
    },
    /// Decode a message file and print it as JSON.
    Decode { file: PathBuf },
    /// Print the header and entry layout of a message file as JSON.
    Inspect { file: PathBuf },
    /// Receive error-log messages over TCP until Ctrl-C.
    Listen {
        /// Overrides `[default] address`.
        #[arg(long)]
        address: Option<String>,
        /// Overrides `[default] port`.
        #[arg(long)]
        port: Option<u16>,
    },
    /// Send one error-log message over TCP.
    Send {
        /// Name of a `[groups.<name>]` section.
        #[arg(long, conflicts_with = "target", required_unless_present = "target")]
        group: Option<String>,
        /// Explicit `host:port`.
        #[arg(long)]
        target: Option<String>,
        #[command(flatten)]
        message: MessageArgs,
    },
}

/// Fields of the error-log message built by `encode` and `send`.
#[derive(Debug, Args)]
struct MessageArgs {
    #[arg(long)]
    component: String,
    #[arg(long)]
    error_msg: String,
    #[arg(long, default_value = "")]
    context: String,
    #[arg(long, default_value = "")]
    values: String,
    /// Reporter identity; a fresh UUID when absent.
    #[arg(long)]
    user_uuid: Option<String>,
}

impl MessageArgs {
    /// Builds the message, rejecting a `--user-uuid` that is not a UUID.
    fn into_message(self) -> anyhow::Result<ErrorLogMessage> {
        let user_uuid = match self.user_uuid {
            Some(id) if !is_uuid(&id) => bail!("--user-uuid '{id}' is not a hyphenated UUID"),
            Some(id) => id,
            None => generate_uuid(),
        };
        Ok(ErrorLogMessage {
            user_uuid,
            component: self.component,
            error_msg: self.error_msg,
            context: self.context,
            values: self.values,
        })
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let create_server = matches!(cli.command, Command::Listen { .. });
    let cfg = initialize(NAME, cli.config.as_deref(), create_server)?;

    match cli.command {
        Command::Encode { message, out } => {
            let bytes = message.into_message()?.encode()?;
            std::fs::write(&out, &bytes)
                .with_context(|| format!("failed to write {}", out.display()))?;
            info!("wrote {} bytes to {}", bytes.len(), out.display());
        }

        Command::Decode { file } => {
            let bytes = read_message_file(&file)?;
            let kind = MessageHeader::parse(&bytes)?.kind;
            match MessageKind::try_from(kind) {
                Ok(MessageKind::ErrorLog) => {}
                Err(()) => bail!("{}: unsupported message kind 0x{kind:02X}", file.display()),
            }
            let msg = ErrorLogMessage::decode(&bytes)
                .with_context(|| format!("failed to decode {}", file.display()))?;
            println!("{}", serde_json::to_string_pretty(&msg)?);
        }

        Command::Inspect { file } => {
            let bytes = read_message_file(&file)?;
            let layout = inspect(&bytes)
                .with_context(|| format!("failed to inspect {}", file.display()))?;
            println!("{}", serde_json::to_string_pretty(&layout)?);
        }

        Command::Listen { address, port } => {
            let mut listen = cfg.default.clone();
            if let Some(address) = address {
                listen.address = address;
            }
            if let Some(port) = port {
                listen.port = port;
            }

            let addr: SocketAddr = listen
                .listen_addr()
                .parse()
                .with_context(|| format!("invalid listen address '{}'", listen.listen_addr()))?;
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .with_context(|| format!("failed to bind {addr}"))?;

            let sink: Arc<dyn ErrorSink> = Arc::new(TracingErrorSink);
            info!("{NAME} ready.  Press Ctrl-C to exit.");
            serve(listener, listen.max_message_size, sink, async {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("shutdown signal received");
                }
            })
            .await?;
            info!("{NAME} stopped");
        }

        Command::Send {
            group,
            target,
            message,
        } => {
            let addr = match (group, target) {
                (Some(name), _) => cfg.group(&name)?.target_addr(),
                (None, Some(target)) => target,
                (None, None) => bail!("either --group or --target is required"),
            };
            let sent = send_message(addr.as_str(), &message.into_message()?)
                .await
                .with_context(|| format!("failed to send to {addr}"))?;
            info!("sent {sent} bytes to {addr}");
        }
    }

    Ok(())
}

/// Reads `path` and checks that it holds a Hanami message.
fn read_message_file(path: &std::path::Path) -> anyhow::Result<Vec<u8>> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    if !is_hanami_protocol(&bytes) {
        bail!("{} is not a Hanami message", path.display());
    }
    Ok(bytes)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
