//! Intrusion Watcher CLI
//!
//! NumLock-armed activity alarm with webcam, screenshot and Telegram alerts.

use chrono::Local;
use clap::{Parser, Subcommand};
use intrusion_watcher::{
    audit::create_shared_log_with_persistence,
    capture::{CaptureKind, CommandCapture},
    collector::{Collector, InputSource},
    config::{Config, Credentials, SourceConfig},
    core::{ArmState, ArmingMachine, CooldownGate},
    dispatcher::Dispatcher,
    notify::{BlockingTelegramClient, Notifier, TelegramConfig},
    responder::IntrusionResponder,
    MONITORING_NOTICE, VERSION,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "intrusion-watcher")]
#[command(version = VERSION)]
#[command(about = "NumLock-armed intrusion watcher with Telegram alerts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start watching input devices
    Start {
        /// Input sources to watch (keyboard, mouse, or all)
        #[arg(long, default_value = "all")]
        sources: String,

        /// Directory for the audit log and captured photos
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Minimum seconds between alerts
        #[arg(long)]
        cooldown: Option<u64>,
    },

    /// List detected input devices and their roles
    Devices,

    /// Show configuration and cumulative statistics
    Status,

    /// Show configuration
    Config,

    /// Send a test notification to verify the Telegram setup
    TestNotify,

    /// Display the monitoring notice
    Notice,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Start {
            sources,
            output_dir,
            cooldown,
        } => {
            cmd_start(&sources, output_dir, cooldown);
        }
        Commands::Devices => {
            cmd_devices();
        }
        Commands::Status => {
            cmd_status();
        }
        Commands::Config => {
            cmd_config();
        }
        Commands::TestNotify => {
            cmd_test_notify();
        }
        Commands::Notice => {
            cmd_notice();
        }
    }
}

fn cmd_start(sources: &str, output_dir: Option<PathBuf>, cooldown: Option<u64>) {
    println!("Intrusion Watcher v{VERSION}");
    println!();

    let credentials = Credentials::from_env().unwrap_or_else(|e| fail(&e));

    let source_config = SourceConfig::from_csv(sources);
    if !source_config.any_enabled() {
        eprintln!("Error: At least one source must be enabled (keyboard or mouse)");
        std::process::exit(1);
    }

    let mut config = Config::load().unwrap_or_else(|e| {
        warn!("Could not load config, using defaults: {e}");
        Config::default()
    });
    config.sources = source_config;
    if let Some(dir) = output_dir {
        config.output_dir = dir;
    }
    if let Some(secs) = cooldown {
        config.cooldown = Duration::from_secs(secs);
    }
    if let Err(e) = config.ensure_directories() {
        fail(&e);
    }

    let mut collector =
        Collector::discover(config.sources.collector_config()).unwrap_or_else(|e| fail(&e));
    print_sources(collector.sources(), collector.indicator());

    let audit = create_shared_log_with_persistence(config.log_path(), config.stats_path())
        .unwrap_or_else(|e| fail(&e));

    let notifier = BlockingTelegramClient::new(TelegramConfig::from_config(&config, credentials))
        .unwrap_or_else(|e| fail(&e));

    let responder = IntrusionResponder::new(
        config.output_dir.clone(),
        Box::new(CommandCapture::new(
            CaptureKind::Webcam,
            config.webcam.clone(),
            config.capture_timeout,
        )),
        Box::new(CommandCapture::new(
            CaptureKind::Screen,
            config.screen.clone(),
            config.capture_timeout,
        )),
        Box::new(notifier),
        audit.clone(),
    );

    if collector.indicator().is_none() {
        warn!("No NumLock indicator found; the watcher stays armed");
    }
    let machine = ArmingMachine::new(collector.indicator(), collector.indicator_on());

    println!();
    println!(
        "Intrusion Watcher running (active when NumLock OFF, cooldown {}s)",
        config.cooldown.as_secs()
    );
    println!(
        "Currently {}",
        if machine.state() == ArmState::Armed {
            "ARMED (NumLock OFF)"
        } else {
            "DISARMED (NumLock ON)"
        }
    );
    println!("Audit log: {}", audit.path().display());
    println!("Press Ctrl+C to stop");
    println!();

    let mut dispatcher = Dispatcher::new(
        collector.sources().to_vec(),
        machine,
        CooldownGate::new(config.cooldown),
        responder,
        audit.clone(),
    );

    let running = Arc::new(AtomicBool::new(true));
    ctrlc_handler(running.clone());

    if let Err(e) = collector.start() {
        fail(&e);
    }

    let receiver = collector.receiver().clone();
    dispatcher.run(&receiver, &running);

    println!();
    println!("Stopping watcher...");
    collector.stop();

    if let Err(e) = audit.save() {
        eprintln!("Warning: Could not save statistics: {e}");
    }

    println!();
    println!("{}", audit.summary());
}

fn cmd_devices() {
    let config = Config::load().unwrap_or_default();
    let collector =
        Collector::discover(config.sources.collector_config()).unwrap_or_else(|e| fail(&e));

    print_sources(collector.sources(), collector.indicator());
    println!();
    match collector.indicator() {
        Some(_) => println!(
            "NumLock is {} (watcher would start {})",
            if collector.indicator_on() { "ON" } else { "OFF" },
            if collector.indicator_on() {
                "disarmed"
            } else {
                "armed"
            }
        ),
        None => println!("No NumLock indicator found; the watcher would always be armed"),
    }
}

fn cmd_status() {
    let config = Config::load().unwrap_or_default();

    println!("Intrusion Watcher Status");
    println!("========================");
    println!();

    println!(
        "Telegram credentials: {}",
        match Credentials::from_env() {
            Ok(_) => "present ✓".to_string(),
            Err(e) => format!("missing ✗ ({e})"),
        }
    );
    println!();

    println!("Configuration:");
    println!(
        "  Keyboard watch: {}",
        if config.sources.keyboard {
            "enabled"
        } else {
            "disabled"
        }
    );
    println!(
        "  Mouse watch: {}",
        if config.sources.mouse {
            "enabled"
        } else {
            "disabled"
        }
    );
    println!("  Cooldown: {}s", config.cooldown.as_secs());
    println!("  Webcam command: {}", config.webcam.program);
    println!("  Screen command: {}", config.screen.program);
    println!("  Output directory: {:?}", config.output_dir);
    println!();

    let stats_path = config.stats_path();
    if stats_path.exists() {
        if let Ok(content) = std::fs::read_to_string(&stats_path) {
            if let Ok(stats) = serde_json::from_str::<serde_json::Value>(&content) {
                println!("Cumulative Statistics:");
                for (key, label) in [
                    ("candidates", "Intrusion candidates"),
                    ("triggers", "Alerts triggered"),
                    ("suppressed", "Suppressed by cooldown"),
                    ("capture_failures", "Capture failures"),
                    ("delivery_failures", "Delivery failures"),
                ] {
                    if let Some(value) = stats.get(key) {
                        println!("  {label}: {value}");
                    }
                }
            }
        }
    } else {
        println!("No previous session data found.");
    }
}

fn cmd_config() {
    let config = Config::load().unwrap_or_default();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "Error".to_string())
    );
}

fn cmd_test_notify() {
    let credentials = Credentials::from_env().unwrap_or_else(|e| fail(&e));
    let config = Config::load().unwrap_or_default();
    let client = BlockingTelegramClient::new(TelegramConfig::from_config(&config, credentials))
        .unwrap_or_else(|e| fail(&e));

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    let message = format!(
        "Intrusion Watcher test from {host} at {}",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    match client.send_text(&message) {
        Ok(()) => println!("Test notification sent."),
        Err(e) => fail(&e),
    }
}

fn cmd_notice() {
    println!("{MONITORING_NOTICE}");
}

fn print_sources(sources: &[InputSource], indicator: Option<usize>) {
    for source in sources {
        if Some(source.id) == indicator {
            println!("[+] NumLock device: {} ({})", source.path, source.name);
        }
        if source.roles.keyboard {
            println!("[+] Keyboard: {} ({})", source.path, source.name);
        }
        if source.roles.pointer {
            println!("[+] Mouse: {} ({})", source.path, source.name);
        }
    }
}

/// Print a fatal error and exit.
fn fail(error: &dyn std::fmt::Display) -> ! {
    eprintln!("Error: {error}");
    std::process::exit(1);
}

/// Set up Ctrl+C handler.
fn ctrlc_handler(running: Arc<AtomicBool>) {
    if let Err(e) = ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    }) {
        warn!("Could not install Ctrl+C handler: {e}");
    }
}
