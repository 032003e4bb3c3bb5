//! `aik-device`: drives an in-process injection device from the command line.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config()              -- --config path or platform default
//!  └─ ConnectionRegistry          -- SendInputSink attached on Windows
//!  └─ SequentialQueue::spawn()    -- owns the Dispatcher
//!  └─ one or more submit() calls  -- built from the subcommand
//!  └─ print responses + ForwardingStats
//! ```
//!
//! Without an attached sink every inject still succeeds; the statistics show
//! the events under `degraded_events`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use aik_core::keymap::KeyMapper;
use aik_core::protocol::{encode_batch_request, encode_single_request};
use aik_core::{InjectionBatch, Opcode, ScancodeEvent};
use aik_device::application::dispatch::Dispatcher;
use aik_device::application::forward::ForwardingStats;
use aik_device::application::registry::ConnectionRegistry;
use aik_device::infrastructure::config::{load_config, DeviceConfig, SinkKind};
use aik_device::infrastructure::queue::{QueueHandle, QueuedResponse, SequentialQueue};

/// Output capacity offered with every request.
const OUTPUT_CAPACITY: usize = 64;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Synthetic keyboard scancode injection device.
#[derive(Debug, Parser)]
#[command(name = "aik-device", version)]
struct Cli {
    /// Path to a `device.toml`; defaults to the platform config directory.
    #[arg(long, global = true, env = "AIK_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Liveness check; prints the device's reply.
    Ping,
    /// Round-trips `text` through the device.
    Echo { text: String },
    /// Prints the wire format version.
    Version,
    /// Injects one raw scancode (decimal or `0x` hex).
    Inject {
        #[arg(value_parser = parse_scancode)]
        code: u16,
        /// Send a key release instead of a press.
        #[arg(long)]
        up: bool,
        /// Mark the code as an E0-prefixed extended key.
        #[arg(long)]
        extended: bool,
    },
    /// Presses and releases a named key (`enter`, `f5`, `left`, ...).
    Tap { key: String },
    /// Types `text` on a US layout.
    Type { text: String },
    /// Sends a key chord: `hotkey ctrl shift esc` or `hotkey ctrl+c`.
    Hotkey {
        #[arg(required = true)]
        keys: Vec<String>,
    },
}

fn parse_scancode(s: &str) -> Result<u16, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid scancode {s:?}: {e}"))
}

/// Flattens `["ctrl+shift", "esc"]` into `["ctrl", "shift", "esc"]`.
fn chord_names(keys: &[String]) -> Vec<&str> {
    keys.iter().flat_map(|k| k.split('+')).collect()
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref()).context("failed to load configuration")?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .with_context(|| format!("invalid log level {:?}", config.logging.level))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(device = %config.device.name, sink = ?config.device.sink, "device starting");

    let registry = Arc::new(ConnectionRegistry::new());
    let stats = Arc::new(ForwardingStats::new());
    attach_sink(&config, &registry);

    let dispatcher = Dispatcher::new(Arc::clone(&registry), Arc::clone(&stats));
    let (queue, task) = SequentialQueue::spawn(dispatcher, config.device.queue_depth);

    run_command(&queue, cli.command).await?;

    drop(queue);
    task.await.context("request queue task failed")?;

    let snapshot = stats.snapshot();
    println!("--- forwarding statistics ---");
    print!("{}", toml::to_string(&snapshot).context("failed to format statistics")?);
    Ok(())
}

fn attach_sink(config: &DeviceConfig, registry: &ConnectionRegistry) {
    match config.device.sink {
        SinkKind::None => info!("no sink configured; running degraded"),
        SinkKind::SendInput => {
            #[cfg(target_os = "windows")]
            {
                use aik_device::infrastructure::sink::windows::SendInputSink;
                registry.attach(Arc::new(SendInputSink::new()));
            }
            #[cfg(not(target_os = "windows"))]
            {
                let _ = registry;
                tracing::warn!("send-input sink is only available on Windows; running degraded");
            }
        }
    }
}

async fn run_command(queue: &QueueHandle, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Ping => {
            let response = submit(queue, Opcode::Ping, Vec::new()).await?;
            let reply = response.output.split(|&b| b == 0).next().unwrap_or_default();
            println!("ping: {:?} ({})", String::from_utf8_lossy(reply), status(&response));
        }
        Command::Echo { text } => {
            let response = submit(queue, Opcode::Echo, text.into_bytes()).await?;
            println!(
                "echo: {:?} ({})",
                String::from_utf8_lossy(&response.output),
                status(&response)
            );
        }
        Command::Version => {
            let response = submit(queue, Opcode::QueryVersion, Vec::new()).await?;
            match <[u8; 4]>::try_from(response.output.as_slice()) {
                Ok(bytes) => println!("wire version: {}", u32::from_le_bytes(bytes)),
                Err(_) => println!("version query failed ({})", status(&response)),
            }
        }
        Command::Inject { code, up, extended } => {
            let event = ScancodeEvent::new(code, up, extended);
            let response = submit(queue, Opcode::InjectOne, encode_single_request(&event)).await?;
            report_inject(&response);
        }
        Command::Tap { key } => {
            let events = KeyMapper::tap(&key).with_context(|| format!("cannot tap {key:?}"))?;
            inject_all(queue, &events).await?;
        }
        Command::Type { text } => {
            let events = KeyMapper::text_to_events(&text).context("cannot type text")?;
            inject_all(queue, &events).await?;
        }
        Command::Hotkey { keys } => {
            let names = chord_names(&keys);
            let events = KeyMapper::hotkey(&names)
                .with_context(|| format!("cannot send hotkey {}", names.join("+")))?;
            inject_all(queue, &events).await?;
        }
    }
    Ok(())
}

async fn inject_all(queue: &QueueHandle, events: &[ScancodeEvent]) -> anyhow::Result<()> {
    for batch in InjectionBatch::chunked(events) {
        let response = submit(queue, Opcode::InjectBatch, encode_batch_request(&batch)).await?;
        report_inject(&response);
    }
    Ok(())
}

async fn submit(
    queue: &QueueHandle,
    opcode: Opcode,
    input: Vec<u8>,
) -> anyhow::Result<QueuedResponse> {
    queue
        .submit(opcode.code(), input, OUTPUT_CAPACITY)
        .await
        .with_context(|| format!("{opcode:?} request was not completed"))
}

fn report_inject(response: &QueuedResponse) {
    match &response.result {
        Ok(completion) => println!(
            "inject: consumed {} ({})",
            completion.consumed.unwrap_or_default(),
            status(response)
        ),
        Err(err) => println!("inject rejected: {err} ({})", status(response)),
    }
}

fn status(response: &QueuedResponse) -> String {
    let code = response.status();
    format!("{code:?} 0x{:08X}", code.as_u32())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
