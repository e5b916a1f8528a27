use clap::{CommandFactory, Parser};
use smfstat::smf::{read_smf_file, DecodeOptions, SmfDecoder};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "smfstat")]
#[command(version = "0.1.0")]
#[command(about = "Per-track channel statistics for Standard MIDI Files", long_about = None)]
struct Args {
    /// Input MIDI file (may be gzip-compressed)
    input: Option<PathBuf>,

    /// Output JSON file (writes to stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output compact JSON (default is pretty-printed)
    #[arg(short, long)]
    compact: bool,

    /// Output the header and dropped tracks along with the track list
    #[arg(short, long)]
    full: bool,

    /// Fail a track on system common/real-time events instead of skipping them
    #[arg(short, long)]
    strict: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    let Some(input) = args.input.as_deref() else {
        println!("{}", Args::command().render_usage());
        return ExitCode::from(1);
    };

    match run(&args, input) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {}", input.display(), e);
            ExitCode::from(1)
        }
    }
}

fn run(args: &Args, input: &Path) -> smfstat::error::Result<()> {
    let data = read_smf_file(input)?;

    let decoder = SmfDecoder::new(DecodeOptions {
        strict: args.strict,
    });
    let result = decoder.decode(&data)?;

    let json_string = match (args.full, args.compact) {
        (true, true) => serde_json::to_string(&result)?,
        (true, false) => serde_json::to_string_pretty(&result)?,
        (false, true) => serde_json::to_string(&result.tracks)?,
        (false, false) => serde_json::to_string_pretty(&result.tracks)?,
    };

    match &args.output {
        Some(path) => {
            let mut file = File::create(path)?;
            file.write_all(json_string.as_bytes())?;
            file.write_all(b"\n")?;
        }
        None => {
            println!("{}", json_string);
        }
    }

    Ok(())
}
