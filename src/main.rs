//! VahanaIO - Rover chassis telemetry and teleop daemon
//!
//! Spawns the iris, status, and (optionally) pan/tilt nodes as named
//! threads over one in-process bus. Ctrl-C stops every node at its next
//! period boundary; a hard disconnect on any polled link exits the
//! process nonzero so the supervisor respawns it.

use std::env;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use vahana_io::bus::Bus;
use vahana_io::error::{Error, NodeError, Result};
use vahana_io::iris::IrisNode;
use vahana_io::pantilt::PanTiltNode;
use vahana_io::status::system::SysinfoMetrics;
use vahana_io::status::StatusNode;
use vahana_io::transport::open_transport;
use vahana_io::{scheduler, Config};

/// Parse config path from command line arguments.
///
/// Supports:
/// - `vahana-io <path>` (positional)
/// - `vahana-io --config <path>` (flag-based)
/// - `vahana-io -c <path>` (short flag)
///
/// Defaults to `/etc/vahana-io.toml` if not specified.
fn parse_config_path() -> String {
    let args: Vec<String> = env::args().collect();

    for i in 1..args.len() {
        if (args[i] == "--config" || args[i] == "-c") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }

    if args.len() > 1 && !args[1].starts_with('-') {
        return args[1].clone();
    }

    "/etc/vahana-io.toml".to_string()
}

fn run() -> Result<()> {
    let config_path = parse_config_path();
    log::info!("Using config: {}", config_path);
    let config = Config::load(&config_path)?;

    let bus = Bus::new();

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    // The pan/tilt inbox must exist before anything publishes to it
    let pantilt_inbox = bus.subscribe(&config.topics.pan_tilt);

    let iris_transport = open_transport(&config.transport)?;

    let mut handles: Vec<(&str, thread::JoinHandle<std::result::Result<(), NodeError>>)> =
        Vec::new();

    // Each node closure trips the shutdown flag on a fatal exit so its
    // siblings wind down instead of outliving it.
    let spawn_node = |name: &'static str,
                      rate_hz: f64,
                      mut tick: Box<dyn FnMut(std::time::Instant) -> std::result::Result<(), NodeError> + Send>|
     -> Result<thread::JoinHandle<std::result::Result<(), NodeError>>> {
        let running = Arc::clone(&running);
        thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                let result = scheduler::run_node(name, rate_hz, &running, |now| tick(now));
                if result.is_err() {
                    running.store(false, Ordering::Relaxed);
                }
                result
            })
            .map_err(|e| Error::Other(format!("Failed to spawn {} node: {}", name, e)))
    };

    {
        let mut node = IrisNode::new(iris_transport, &config, bus.clone());
        let handle = spawn_node("iris", config.iris.rate_hz, Box::new(move |now| node.tick(now)))?;
        handles.push(("iris", handle));
    }

    {
        let mut node = StatusNode::new(&config, bus.clone(), Box::new(SysinfoMetrics::new()));
        let handle = spawn_node(
            "status",
            config.status.rate_hz,
            Box::new(move |now| node.tick(now)),
        )?;
        handles.push(("status", handle));
    }

    if config.pantilt.enabled {
        let transport = open_transport(&config.pantilt.transport)?;
        let mut node = PanTiltNode::new(
            transport,
            pantilt_inbox,
            config.pantilt.register_base,
            config.pantilt.contact_timeout(),
        );
        let handle = spawn_node(
            "pantilt",
            config.pantilt.rate_hz,
            Box::new(move |now| node.tick(now)),
        )?;
        handles.push(("pantilt", handle));
    }

    log::info!("VahanaIO running. Press Ctrl-C to stop.");

    let mut fatal: Option<Error> = None;
    for (name, handle) in handles {
        match handle.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                fatal.get_or_insert(e.into());
            }
            Err(_) => {
                running.store(false, Ordering::Relaxed);
                log::error!("{} node thread panicked", name);
                fatal.get_or_insert(Error::Other(format!("{} node thread panicked", name)));
            }
        }
    }

    match fatal {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("VahanaIO v{} starting...", env!("CARGO_PKG_VERSION"));

    match run() {
        Ok(()) => {
            log::info!("VahanaIO stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("VahanaIO exiting: {}", e);
            ExitCode::FAILURE
        }
    }
}
