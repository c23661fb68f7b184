// Keynorm CLI
// Grabs hardware keyboards and re-emits normalized events on a virtual keyboard

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use keynorm_core::{
    build_extra_key_map, EvdevSource, ExtraKeyMap, KeyEventProcessor, Session, Settings,
    VirtualKeyboard,
};

/// Keyboard event normalizer
#[derive(Parser, Debug)]
#[command(name = "keynorm")]
#[command(version)]
#[command(about = "Tap/hold disambiguation, sticky shift and long-press signals for evdev keyboards", long_about = None)]
struct Args {
    /// TOML settings file (default: ~/.config/keynorm/settings.toml)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Devices to read by name or path (can be used multiple times)
    #[arg(short, long, value_name = "DEVICE")]
    devices: Vec<String>,

    /// Do not take exclusive access to the input devices
    #[arg(long)]
    no_grab: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Validate settings and exit
    #[arg(long)]
    check_config: bool,

    /// List input devices that report key events
    #[arg(long)]
    list_devices: bool,
}

impl Args {
    /// CLI --devices > settings [devices].only > autodetect
    fn device_filter(&self, settings: &Settings) -> Vec<String> {
        if !self.devices.is_empty() {
            self.devices.clone()
        } else {
            settings.devices.clone()
        }
    }

    fn grab(&self, settings: &Settings) -> bool {
        settings.grab && !self.no_grab
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .init();
}

fn list_devices() {
    let devices = EvdevSource::list_devices();
    if devices.is_empty() {
        println!("No input devices with key events found (are you in the 'input' group?)");
        return;
    }
    for device in devices {
        println!(
            "{:>2}: {} [{}]{}",
            device.index,
            device.name,
            device.path.as_deref().unwrap_or("?"),
            if device.is_keyboard { " keyboard" } else { "" }
        );
    }
}

fn extra_key_map(source: &EvdevSource, settings: &Settings) -> ExtraKeyMap {
    if !settings.extra_keys {
        return ExtraKeyMap::new();
    }
    let available = source.available_keys();
    if available.is_empty() {
        log::warn!("devices reported no key capabilities, extra keys stay unmapped");
        return ExtraKeyMap::new();
    }
    build_extra_key_map(available)
}

fn spawn_signal_handler(running: Arc<AtomicBool>) -> anyhow::Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM]).context("installing signal handlers")?;
    std::thread::spawn(move || {
        if let Some(signal) = signals.forever().next() {
            log::info!("received signal {}, shutting down", signal);
            running.store(false, Ordering::SeqCst);
        }
    });
    Ok(())
}

fn run(args: &Args, settings: &Settings) -> anyhow::Result<()> {
    let filter = args.device_filter(settings);
    let source = EvdevSource::open(&filter, args.grab(settings)).context("opening input devices")?;

    let extra_keys = extra_key_map(&source, settings);
    let processor = KeyEventProcessor::with_config(settings.processor_config(extra_keys));
    let sink = VirtualKeyboard::new().context("creating virtual keyboard")?;

    let mut session = Session::new(source, sink, processor).with_poll_interval(settings.poll_interval);
    if let Some(key) = settings.suspend_key {
        log::info!("double-tap {} to suspend/resume", key);
        session = session.with_suspend_key(key, settings.double_tap);
    }

    let running = Arc::new(AtomicBool::new(true));
    spawn_signal_handler(running.clone())?;

    session.run(&running).context("event loop failed")?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    if args.list_devices {
        list_devices();
        return Ok(());
    }

    let settings = Settings::load(args.config.as_deref()).context("loading settings")?;
    match settings.source_path() {
        Some(path) => log::info!("settings loaded from {}", path.display()),
        None => log::info!("using default settings"),
    }

    if args.check_config {
        println!("Configuration is valid");
        return Ok(());
    }

    run(&args, &settings)
}
