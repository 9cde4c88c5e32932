//! winkeyerdaemon CLI
//!
//! Usage:
//!   winkeyerdaemon --device /dev/ttyUSB0                 # listen on 127.0.0.1:6789
//!   winkeyerdaemon --config ~/.winkeyerdaemon.toml        # settings from a file
//!   winkeyerdaemon --device /dev/ttyUSB0 --debug --json   # debug events as JSON lines

use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use tracing::{info, warn};

use winkeyerdaemon::config::Config;
use winkeyerdaemon::core::{
    Daemon, DebugSink, JsonSink, KeyerLink, NullSink, SerialKeyer, TracingSink, WinkeyerEncoder,
};
use winkeyerdaemon::error::Result;
use winkeyerdaemon::logging::init_tracing;
use winkeyerdaemon::VERSION;

#[derive(Parser, Debug)]
#[command(
    name = "winkeyerdaemon",
    version = VERSION,
    about = "cwdaemon-compatible UDP front end for WinKeyer keyers",
    long_about = "Listens for cwdaemon datagrams and keys a WinKeyer over its serial\n\
                  host interface, so logging programs that speak cwdaemon can drive\n\
                  the keyer unmodified.\n\n\
                  Flags override values from --config."
)]
struct Args {
    /// Serial device of the keyer
    #[arg(short, long)]
    device: Option<String>,

    /// UDP port to listen on (default: 6789)
    #[arg(short, long)]
    port: Option<u16>,

    /// Accept datagrams from non-loopback hosts
    #[arg(long)]
    accept_remote_hosts: bool,

    /// Debug logging and diagnostic events
    #[arg(long)]
    debug: bool,

    /// Emit diagnostic events as JSON lines on stdout (implies --debug)
    #[arg(long)]
    json: bool,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable sidetone at the default frequency
    #[arg(long)]
    sidetone_on: bool,

    /// Sidetone frequency in Hz (enables sidetone)
    #[arg(long, value_name = "HZ")]
    sidetone: Option<u16>,

    /// Swap dit and dah paddles
    #[arg(long)]
    swap: bool,

    /// Key on KEY2 instead of KEY1
    #[arg(long)]
    key2: bool,

    /// Key on both KEY1 and KEY2
    #[arg(long)]
    key12: bool,

    /// Contest word spacing (6 dits)
    #[arg(long)]
    contest_spacing: bool,

    /// Paddle autospace
    #[arg(long)]
    autospace: bool,

    /// First element extension in ms
    #[arg(long, value_name = "MS")]
    first_extension: Option<u8>,

    /// Key compensation in ms
    #[arg(long, value_name = "MS")]
    key_compensation: Option<u8>,

    /// Let the keyer drive PTT
    #[arg(long)]
    ptt_enable: bool,

    /// PTT lead time in ms (multiple of 10)
    #[arg(long, value_name = "MS")]
    ptt_lead: Option<u8>,

    /// PTT tail time in ms (multiple of 10)
    #[arg(long, value_name = "MS")]
    ptt_tail: Option<u8>,

    /// PTT hang time in dits: 1, 2, 4 or 8
    #[arg(long, value_name = "DITS")]
    hang: Option<u8>,
}

impl Args {
    /// Flags given on the command line win over the config file
    fn apply(&self, config: &mut Config) {
        if let Some(device) = &self.device {
            config.device = Some(device.clone());
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        config.accept_remote_hosts |= self.accept_remote_hosts;
        config.json |= self.json;
        config.debug |= self.debug || config.json;

        let keyer = &mut config.keyer;
        keyer.sidetone = self.sidetone.or(keyer.sidetone);
        keyer.sidetone_on |= self.sidetone_on;
        keyer.swap |= self.swap;
        keyer.key2 |= self.key2;
        keyer.key12 |= self.key12;
        keyer.contest_spacing |= self.contest_spacing;
        keyer.autospace |= self.autospace;
        keyer.first_extension = self.first_extension.or(keyer.first_extension);
        keyer.key_compensation = self.key_compensation.or(keyer.key_compensation);
        keyer.ptt_enable |= self.ptt_enable;
        keyer.ptt_lead = self.ptt_lead.unwrap_or(keyer.ptt_lead);
        keyer.ptt_tail = self.ptt_tail.unwrap_or(keyer.ptt_tail);
        keyer.hang = self.hang.unwrap_or(keyer.hang);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    if let Err(e) = run(args).await {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = Config::load_or_default(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate()?;

    init_tracing(config.debug);
    print_banner(&config);

    if config.accept_remote_hosts {
        warn!("Accepting datagrams from any host");
    }

    let profile = config.to_profile()?;
    let keyer = SerialKeyer::open(config.device()?, config.baud)?;
    info!(firmware = keyer.firmware(), "WinKeyer ready");

    let sink: Box<dyn DebugSink> = if config.json {
        Box::new(JsonSink::stdout())
    } else if config.debug {
        Box::new(TracingSink)
    } else {
        Box::new(NullSink)
    };

    serve(keyer, sink, WinkeyerEncoder::new(profile), &config).await
}

async fn serve<L: KeyerLink>(
    keyer: L,
    sink: Box<dyn DebugSink>,
    encoder: WinkeyerEncoder,
    config: &Config,
) -> Result<()> {
    let mut daemon = Daemon::bind(
        config.bind_addr(),
        keyer,
        sink,
        encoder,
        config.accept_remote_hosts,
    )
    .await?;

    if let Err(e) = daemon.start() {
        // host mode is open; leave it before bailing out
        let _ = daemon.shutdown();
        return Err(e);
    }

    daemon.run(shutdown_signal()).await?;
    info!(datagrams = daemon.datagrams(), "Keyer released");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Cannot listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Cannot listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

/// Banner on stderr; stdout may carry JSON events
fn print_banner(config: &Config) {
    let device = config.device.as_deref().unwrap_or("-");
    let debug = if config.json { "json" } else { "log" };
    eprintln!("{}", format!("winkeyerdaemon v{}", VERSION).bold());
    eprintln!("  {} {}", "keyer ".dimmed(), device.cyan());
    eprintln!("  {} {}", "listen".dimmed(), config.bind_addr().cyan());
    if config.debug {
        eprintln!("  {} {}", "debug ".dimmed(), debug.yellow());
    }
    eprintln!();
}
