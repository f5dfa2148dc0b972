use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::Parser;

use chunkwarp_core::audio::domain::pitch_analyzer::{NullPitchAnalyzer, PitchAnalyzer};
use chunkwarp_core::audio::domain::sample_format::SampleFormat;
use chunkwarp_core::audio::infrastructure::spectral_pitch_analyzer::SpectralPitchAnalyzer;
use chunkwarp_core::media::infrastructure::decoder_factory::{create_decoder, create_source};
use chunkwarp_core::media::infrastructure::directory_clip_pool::DirectoryClipPool;
use chunkwarp_core::media::infrastructure::file_audio_sink::FileAudioSink;
use chunkwarp_core::media::infrastructure::http_audio_source::is_remote;
use chunkwarp_core::media::infrastructure::wav_encoder::WavEncoder;
use chunkwarp_core::pipeline::chunk_executor::{ChunkExecutor, SequentialChunkExecutor};
use chunkwarp_core::pipeline::infrastructure::threaded_chunk_executor::ThreadedChunkExecutor;
use chunkwarp_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use chunkwarp_core::pipeline::warp_audio_use_case::WarpAudioUseCase;
use chunkwarp_core::shared::config::WarpConfig;
use chunkwarp_core::shared::constants::DEFAULT_OUTPUT_FILENAME;

/// Split a recording into chunks, distort each one at random, and lay the
/// result over a boosted copy of the original.
#[derive(Parser)]
#[command(name = "chunkwarp", version)]
struct Cli {
    /// Input audio file path or http(s) URL.
    input: String,

    /// Output WAV file.
    #[arg(default_value = DEFAULT_OUTPUT_FILENAME)]
    output: PathBuf,

    /// Directory of foreign clips to mix into chunks.
    #[arg(long)]
    clips: Option<PathBuf>,

    /// JSON configuration file. Flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Chunk duration in milliseconds.
    #[arg(long)]
    chunk_ms: Option<u64>,

    /// Seed for reproducible output.
    #[arg(long)]
    seed: Option<u64>,

    /// Worker threads for the per-chunk transforms (1 = sequential).
    #[arg(long)]
    threads: Option<usize>,

    /// Gain applied to the original before the overlay, in dB.
    #[arg(long, allow_hyphen_values = true)]
    original_gain_db: Option<f64>,

    /// Pitch offset range in semitones, as MIN,MAX.
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pitch_range: Option<Vec<f64>>,

    /// Speed ratio range, as MIN,MAX.
    #[arg(long, value_delimiter = ',')]
    speed_range: Option<Vec<f64>>,

    /// Clamp drawn speed ratios into MIN,MAX.
    #[arg(long, value_delimiter = ',')]
    speed_clamp: Option<Vec<f64>>,

    /// Band-filter level range (0-100), as MIN,MAX.
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    reverb_range: Option<Vec<i32>>,

    /// Per-chunk gain range in whole dB, as MIN,MAX.
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    gain_range: Option<Vec<i32>>,

    /// Output bit depth: 16, 24, 32 or float. Defaults to the input's.
    #[arg(long)]
    bit_depth: Option<SampleFormat>,

    /// Skip per-chunk pitch estimation.
    #[arg(long)]
    skip_analysis: bool,

    /// Save the effective configuration to this JSON file.
    #[arg(long)]
    write_config: Option<PathBuf>,

    /// Log per-chunk parameters.
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(&cli)?;
    validate(&cli, &config)?;

    if let Some(ref path) = cli.write_config {
        config.save(path)?;
        log::info!("Configuration written to {}", path.display());
    }

    let source = create_source(&cli.input, Some(Box::new(download_progress)));
    let decoder = create_decoder();
    let encoder = match cli.bit_depth {
        Some(format) => WavEncoder::with_format(format),
        None => WavEncoder::new(),
    };
    let analyzer: Box<dyn PitchAnalyzer> = if cli.skip_analysis {
        Box::new(NullPitchAnalyzer)
    } else {
        Box::new(SpectralPitchAnalyzer::new())
    };
    let executor: Box<dyn ChunkExecutor> = if config.threads > 1 {
        Box::new(ThreadedChunkExecutor::new(config.threads))
    } else {
        Box::new(SequentialChunkExecutor)
    };

    let mut use_case = WarpAudioUseCase::new(
        source,
        decoder.clone(),
        Box::new(encoder),
        Box::new(FileAudioSink),
        analyzer,
        executor,
        config,
    )?;
    if let Some(dir) = cli.clips {
        use_case = use_case.with_clip_pool(Box::new(DirectoryClipPool::new(decoder)), dir);
    }

    let mut logger = StdoutPipelineLogger::default();
    let report = use_case.run(&cli.input, &cli.output, &mut logger)?;
    if is_remote(&cli.input) {
        eprintln!();
    }
    log::info!(
        "Output written to {} ({} chunks, seed {})",
        report.output_path.display(),
        report.chunks,
        report.seed
    );
    Ok(())
}

/// Defaults, then the config file, then individual flags.
fn build_config(cli: &Cli) -> Result<WarpConfig, Box<dyn std::error::Error>> {
    let mut config = match cli.config {
        Some(ref path) => WarpConfig::load(path)?,
        None => WarpConfig::default(),
    };

    if let Some(ms) = cli.chunk_ms {
        config.chunk_ms = ms;
    }
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    if let Some(threads) = cli.threads {
        config.threads = threads;
    }
    if let Some(db) = cli.original_gain_db {
        config.original_gain_db = db;
    }
    if let Some(ref v) = cli.pitch_range {
        config.pitch_range = pair("--pitch-range", v)?;
    }
    if let Some(ref v) = cli.speed_range {
        config.speed_range = pair("--speed-range", v)?;
    }
    if let Some(ref v) = cli.speed_clamp {
        config.speed_clamp = Some(pair("--speed-clamp", v)?);
    }
    if let Some(ref v) = cli.reverb_range {
        config.reverb_range = pair("--reverb-range", v)?;
    }
    if let Some(ref v) = cli.gain_range {
        config.gain_range = pair("--gain-range", v)?;
    }
    Ok(config)
}

fn pair<T: Copy>(flag: &str, values: &[T]) -> Result<(T, T), Box<dyn std::error::Error>> {
    match values {
        [min, max] => Ok((*min, *max)),
        _ => Err(format!("{flag} expects MIN,MAX, got {} value(s)", values.len()).into()),
    }
}

fn validate(cli: &Cli, config: &WarpConfig) -> Result<(), Box<dyn std::error::Error>> {
    if !is_remote(&cli.input) && !Path::new(&cli.input).exists() {
        return Err(format!("Input file not found: {}", cli.input).into());
    }
    if cli.output.is_dir() {
        return Err(format!("Output path is a directory: {}", cli.output.display()).into());
    }
    config.validate()?;
    Ok(())
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading input... {pct}%");
    } else {
        eprint!("\rDownloading input... {downloaded} bytes");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("chunkwarp").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["in.wav"]);
        assert_eq!(cli.output, PathBuf::from("manipulated_audio.wav"));
        assert_eq!(build_config(&cli).unwrap(), WarpConfig::default());
    }

    #[test]
    fn test_flags_override_config() {
        let cli = parse(&[
            "in.wav",
            "out.wav",
            "--chunk-ms",
            "250",
            "--seed",
            "9",
            "--pitch-range",
            "-3,1.5",
            "--gain-range",
            "-2,2",
            "--speed-clamp",
            "0.95,1.05",
            "--bit-depth",
            "24",
        ]);
        let config = build_config(&cli).unwrap();
        assert_eq!(config.chunk_ms, 250);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.pitch_range, (-3.0, 1.5));
        assert_eq!(config.gain_range, (-2, 2));
        assert_eq!(config.speed_clamp, Some((0.95, 1.05)));
        assert_eq!(cli.bit_depth, Some(SampleFormat::Int24));
    }

    #[test]
    fn test_range_needs_two_values() {
        let cli = parse(&["in.wav", "--speed-range", "0.9"]);
        assert!(build_config(&cli).is_err());
    }

    #[test]
    fn test_missing_clip_directory_left_to_run() {
        let cli = parse(&["https://example.com/a.wav", "--clips", "/no/such/clips"]);
        assert!(validate(&cli, &WarpConfig::default()).is_ok());
    }

    #[test]
    fn test_missing_local_input_fails_validation() {
        let cli = parse(&["/no/such/input.wav"]);
        assert!(validate(&cli, &WarpConfig::default()).is_err());
    }

    #[test]
    fn test_bad_bit_depth_rejected_by_parser() {
        let result = Cli::try_parse_from(["chunkwarp", "in.wav", "--bit-depth", "12"]);
        assert!(result.is_err());
    }
}
