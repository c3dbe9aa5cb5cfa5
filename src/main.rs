use anyhow::Result;
use audio_batch_analyzer::analysis::StratumAnalyzer;
use audio_batch_analyzer::{run_batch, RunConfig};
use clap::error::ErrorKind;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "audio-analyzer", version)]
#[command(about = "Detect key, tempo and duration for every audio file in a folder", long_about = None)]
struct Args {
    /// Folder with audio files, then the result CSV file path
    #[arg(value_name = "PATH")]
    paths: Vec<String>,

    /// Worker threads (default: available cores minus one)
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// File that collects per-file failures (appended, never cleared)
    #[arg(long, default_value = "bad.txt")]
    error_log: String,

    /// Also analyze files in subfolders
    #[arg(short = 'r', long)]
    recursive: bool,

    /// Minimum BPM for tempo folding (requires --max-bpm)
    #[arg(long, requires = "max_bpm")]
    min_bpm: Option<f32>,

    /// Maximum BPM for tempo folding (requires --min-bpm)
    #[arg(long, requires = "min_bpm")]
    max_bpm: Option<f32>,

    /// Verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

const USAGE: &str =
    "Wrong number of params. Use: audio-analyzer <folder with audio files> <result CSV file path>";

/// The input folder and output CSV, if exactly two paths were given
fn path_pair(paths: &[String]) -> Option<(&str, &str)> {
    match paths {
        [input, output] => Some((input.as_str(), output.as_str())),
        _ => None,
    }
}

fn main() -> Result<()> {
    // Bad invocations print a message but are not an error exit
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            println!("{}", e.render());
            return Ok(());
        }
    };

    let Some((input, output)) = path_pair(&args.paths) else {
        println!("{}", USAGE);
        return Ok(());
    };

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut config = RunConfig::new(expand(input), expand(output))
        .with_error_log(expand(&args.error_log))
        .with_recursive(args.recursive);
    if let Some(threads) = args.threads {
        config = config.with_threads(threads);
    }

    let analyzer = match (args.min_bpm, args.max_bpm) {
        (Some(min), Some(max)) => {
            log::info!("BPM folding range: {}-{} BPM", min, max);
            StratumAnalyzer::new().with_bpm_range(min, max)
        }
        _ => StratumAnalyzer::new(),
    };

    let summary = match run_batch(&config, Box::new(analyzer)) {
        Ok(summary) => summary,
        Err(e) => {
            println!("{:#}", e);
            return Ok(());
        }
    };

    println!("{} file(s) processed", summary.completed);
    if summary.failed > 0 {
        println!(
            "{} file(s) failed, see {}",
            summary.failed,
            config.error_log_path.display()
        );
    }
    if let Some(fault) = summary.fault {
        println!("{}", fault);
    }

    Ok(())
}
