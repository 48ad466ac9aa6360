mod config;
mod display;
mod input;
mod session;
mod signal;
mod sink;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::mpsc;

use clap::Parser;
use dv::driver::{PacketSource, PlaybackSnapshot};
use indicatif::{MultiProgress, ProgressBar};
use indicatif_log_bridge::LogWrapper;

use config::{DEFAULT_SEEK_STEP, SessionConfig};
use display::StatusDisplay;
use session::SessionEnd;
use sink::PacedSink;

/// DV Player: serves a DV stream as paced 480-byte transport packets.
#[derive(Parser)]
#[command(name = "dvplayer")]
struct Args {
    /// Input DV file ("-" or omitted for stdin)
    input: Option<String>,

    /// Packet output ("-" for stdout)
    #[arg(short = 'o', long = "output", default_value = "-")]
    output: String,

    /// Disable interactive commands and the status line
    #[arg(short = 'n', long = "noui")]
    noui: bool,

    /// Frames moved by the forward/rewind commands
    #[arg(long = "seek-step", default_value_t = DEFAULT_SEEK_STEP)]
    seek_step: i64,

    /// Emit playback status as JSON lines on stderr
    #[arg(long = "status-json")]
    status_json: bool,

    /// Print JSON schema for the status output and exit
    #[arg(long)]
    schema: bool,

    /// Display version and quit
    #[arg(long)]
    version: bool,
}

impl Args {
    fn session_config(&self) -> SessionConfig {
        SessionConfig {
            ui_enabled: !self.noui,
            seek_step: self.seek_step,
            status_json: self.status_json,
            ..SessionConfig::default()
        }
    }
}

fn main() {
    let args = Args::parse();

    // Logs are routed through the status line's MultiProgress so they print above it
    let multi = (!args.noui && !args.status_json).then(MultiProgress::new);
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    builder.format_timestamp(None);
    match &multi {
        Some(multi) => {
            let logger = builder.build();
            let level = logger.filter();
            if LogWrapper::new(multi.clone(), logger).try_init().is_ok() {
                log::set_max_level(level);
            }
        }
        None => builder.init(),
    }

    if let Err(e) = run(&args, multi.as_ref()) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args, multi: Option<&MultiProgress>) -> Result<(), Box<dyn std::error::Error>> {
    if args.version {
        dv::version::print_cli_version_banner(
            "DV Player",
            env!("CARGO_PKG_VERSION"),
            env!("RELEASE_VERSION"),
            env!("GIT_COMMIT"),
        );
        return Ok(());
    }

    if args.schema {
        let schema = schemars::schema_for!(PlaybackSnapshot);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    let config = args.session_config();
    let input = args.input.as_deref().unwrap_or("-");
    let reader = dv::source::open_dv(Path::new(input))?;
    let mut source = PacketSource::open(reader)?;
    let standard = source.standard();

    let output: Box<dyn Write> = if args.output == "-" {
        Box::new(io::stdout().lock())
    } else {
        Box::new(BufWriter::new(File::create(&args.output)?))
    };
    let mut sink = PacedSink::new(output, standard, config.max_burst);

    let (tx, rx) = mpsc::channel();
    // Restores the terminal settings when dropped at the end of the session
    let _terminal = if config.ui_enabled {
        match start_input(config.seek_step, tx) {
            Ok(terminal) => {
                log::info!("{}", input::HELP);
                Some(terminal)
            }
            Err(e) => {
                log::warn!("Interactive commands unavailable: {}", e);
                None
            }
        }
    } else {
        drop(tx);
        None
    };

    let mut display = match multi {
        Some(multi) => StatusDisplay::bar(multi.add(ProgressBar::new_spinner()))?,
        None if config.status_json => StatusDisplay::json(io::stderr()),
        None => StatusDisplay::off(),
    };

    signal::install();

    log::info!("Starting to transmit {}.", standard);
    if !source.is_seekable() {
        log::info!("Input is not seekable; seek commands are disabled");
    }

    let end = session::run_session(
        &mut source,
        &mut sink,
        &rx,
        signal::interrupted(),
        &config,
        &mut display,
    );
    display.finish();

    match end? {
        SessionEnd::EndOfStream => log::info!("Done."),
        SessionEnd::Interrupted => log::info!("Interrupted."),
        SessionEnd::Quit => log::info!("Stopped."),
    }
    Ok(())
}

fn start_input(seek_step: i64, tx: mpsc::Sender<input::Command>) -> io::Result<input::Terminal> {
    let terminal = input::Terminal::open()?;
    input::spawn_reader(terminal.reader()?, seek_step, tx);
    Ok(terminal)
}
