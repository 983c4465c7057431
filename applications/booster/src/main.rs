/// Sound Booster - raise loudness, widen and de-boom a single recording
use anyhow::Context;
use booster_audio::effects::{BandEnergyAnalyzer, ReassemblyMode};
use booster_audio::{
    BoosterSession, FormatIngestor, JobRequest, PipelineConfig, ProcessingJob, WavEncoder,
};
use booster_core::AudioEncoder;
use booster_loudness::{GainPolarity, GainSolver, LoudnessNormalizer, TargetRmsLevel};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "booster")]
#[command(about = "Boost, widen and de-boom a recording", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and write a WAV file
    Process {
        /// Input file (mp3, wav)
        input: PathBuf,

        /// Output WAV path
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        common: CommonArgs,

        /// How analysis windows are stitched back together
        #[arg(long, value_parser = parse_reassembly)]
        reassembly: Option<ReassemblyMode>,

        /// Whether the solved gain is subtracted or moves toward the target
        #[arg(long, value_parser = parse_polarity)]
        polarity: Option<GainPolarity>,
    },
    /// Print loudness and window statistics without writing anything
    Analyze {
        /// Input file (mp3, wav)
        input: PathBuf,

        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Target RMS level (2000-12000, higher means less boost)
    #[arg(long)]
    target_rms: Option<u32>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn parse_reassembly(s: &str) -> Result<ReassemblyMode, String> {
    ReassemblyMode::from_str(s)
        .ok_or_else(|| format!("expected 'concatenate' or 'flagged-only', got '{s}'"))
}

fn parse_polarity(s: &str) -> Result<GainPolarity, String> {
    GainPolarity::from_str(s)
        .ok_or_else(|| format!("expected 'subtract' or 'toward-target', got '{s}'"))
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "booster=info,booster_audio=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            input,
            output,
            common,
            reassembly,
            polarity,
        } => {
            let mut config = load_config(&common)?;
            if let Some(reassembly) = reassembly {
                config.reassembly = reassembly;
            }
            if let Some(polarity) = polarity {
                config.gain_polarity = polarity;
            }
            process(&input, &output, config)?;
        }
        Commands::Analyze { input, common } => {
            let config = load_config(&common)?;
            analyze(&input, &config)?;
        }
    }

    Ok(())
}

/// Config file and environment, then the `--target-rms` flag
fn load_config(common: &CommonArgs) -> anyhow::Result<PipelineConfig> {
    let mut config = booster::config::load(common.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(level) = common.target_rms {
        config.target_rms_level = TargetRmsLevel::new(level)?;
    }
    Ok(config)
}

fn process(input: &Path, output: &Path, config: PipelineConfig) -> anyhow::Result<()> {
    let target = config.target_rms_level;
    let mut session = BoosterSession::new(config.clone())?;

    let encoder = WavEncoder::new();
    if output.extension().and_then(|e| e.to_str()) != Some(encoder.extension()) {
        tracing::warn!(
            "Output {} does not end in .{}; writing WAV anyway",
            output.display(),
            encoder.extension()
        );
    }

    let job = ProcessingJob::spawn(JobRequest {
        path: input.to_path_buf(),
        target,
        config,
    })?;

    let report = session
        .accept(job.wait())
        .with_context(|| format!("Failed to process {}", input.display()))?
        .clone();

    session
        .export(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("Processed {}", input.display());
    println!(
        "  RMS:      {:.1} -> target {}",
        report.gain.current_rms, report.gain.target_rms
    );
    println!(
        "  Gain:     {:.2} dB{}",
        report.gain.gain_db,
        if report.gain.clamped { " (clamped)" } else { "" }
    );
    println!(
        "  Windows:  {} analyzed, {} attenuated",
        report.windows, report.flagged_windows
    );
    println!("  Clipped:  {} samples repaired", report.clipped_samples);
    println!(
        "  Duration: {:.2}s -> {:.2}s",
        report.input_duration_secs, report.output_duration_secs
    );
    println!("Wrote {}", output.display());

    Ok(())
}

fn analyze(input: &Path, config: &PipelineConfig) -> anyhow::Result<()> {
    let buffer = FormatIngestor::new(config.ingest.clone())
        .load(input)
        .with_context(|| format!("Failed to load {}", input.display()))?;

    let rms = LoudnessNormalizer::rms(&buffer);
    println!("File:      {}", input.display());
    println!(
        "Format:    {} Hz, {} ch, {}-bit, {:.2}s",
        buffer.sample_rate(),
        buffer.channels(),
        buffer.sample_width().bits(),
        buffer.duration_secs()
    );
    println!(
        "Level:     RMS {:.1} ({:.2} dBFS), peak {}",
        rms,
        LoudnessNormalizer::rms_dbfs(&buffer),
        LoudnessNormalizer::peak(&buffer)
    );

    let solver = GainSolver::new()
        .with_ceiling_db(config.gain_ceiling_db)
        .with_polarity(config.gain_polarity);
    match solver.solve(&buffer, config.target_rms_level) {
        Ok(gain) => println!(
            "Gain:      {:.2} dB toward {} ({}){}",
            gain.gain_db,
            config.target_rms_level.value(),
            config.gain_polarity.as_str(),
            if gain.clamped { ", clamped" } else { "" }
        ),
        Err(err) => println!("Gain:      n/a ({err})"),
    }

    let analyzer = BandEnergyAnalyzer::new(config.window_samples, config.bass_threshold);
    let windows = analyzer.analyze(&buffer)?;
    let flagged = windows.iter().filter(|w| w.bass_heavy).count();
    let loudest = windows.iter().map(|w| w.energy).fold(0.0_f64, f64::max);
    println!(
        "Windows:   {} of {} samples, {} flagged (threshold {}), max energy {:.0}",
        windows.len(),
        config.window_samples,
        flagged,
        config.bass_threshold,
        loudest
    );

    Ok(())
}
