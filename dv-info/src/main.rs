use std::path::Path;

use clap::Parser;
use dv::scan::{DvScan, scan_dv};
use dv::timecode::TIMECODE_PLACEHOLDER;

#[derive(Parser)]
#[command(name = "dv-info", about = "Parse and display DV stream structure")]
struct Args {
    /// Input .dv file ("-" for stdin)
    #[arg(short = 'f', long = "file")]
    file: Option<String>,

    /// Input .dv file (positional)
    #[arg(conflicts_with = "file", required_unless_present_any = ["file", "schema", "version"])]
    input: Option<String>,

    /// Stop after this many frames
    #[arg(long = "frames")]
    frames: Option<u64>,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Print JSON schema for the output format and exit
    #[arg(long)]
    schema: bool,

    /// Display version and quit
    #[arg(long)]
    version: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Reset SIGPIPE to default so piped output (e.g. head/tail) exits cleanly
    #[cfg(unix)]
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }

    let args = Args::parse();

    if args.version {
        dv::version::print_cli_version_banner(
            "DV Info Tool",
            env!("CARGO_PKG_VERSION"),
            env!("RELEASE_VERSION"),
            env!("GIT_COMMIT"),
        );
        return Ok(());
    }

    if args.schema {
        let schema = schemars::schema_for!(DvScan);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    let file = args
        .file
        .or(args.input)
        .ok_or("an input file is required")?;
    let mut reader = dv::source::open_dv(Path::new(&file))?;
    let scan = scan_dv(&mut reader, args.frames)?;

    if args.json {
        println!("{}", serde_json::to_string(&scan)?);
        return Ok(());
    }

    print_table(&scan);
    Ok(())
}

fn print_table(scan: &DvScan) {
    println!(
        "{} ({} bytes/frame, {} packets/frame)",
        scan.standard,
        scan.frame_size,
        scan.standard.packets_per_frame()
    );
    println!(
        "{:>7} {:>12} {:>11} {:>3} {:>3} {:>4} {:>5} {:>5} {:>4}",
        "FRAME", "OFFSET", "TIMECODE", "HDR", "SC", "VAUX", "AUD", "VID", "RSV"
    );

    for frame in &scan.frames {
        let timecode = match frame.timecode {
            Some(tc) => tc.to_string(),
            None => TIMECODE_PLACEHOLDER.to_string(),
        };
        let b = &frame.blocks;
        println!(
            "{:>7} {:>12} {:>11} {:>3} {:>3} {:>4} {:>5} {:>5} {:>4}",
            frame.index, frame.offset, timecode, b.header, b.subcode, b.vaux, b.audio, b.video, b.reserved,
        );
    }

    if scan.trailing_bytes > 0 {
        println!(
            "Truncated final frame: {} of {} bytes",
            scan.trailing_bytes, scan.frame_size
        );
    }
}
