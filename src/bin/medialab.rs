use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "medialab", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply an image filter to a PNG/JPEG file.
    Image(ImageArgs),
    /// Generate a waveform and write raw f32le samples.
    Synth(SynthArgs),
    /// Apply a video effect to directories of numbered frames.
    Video(VideoArgs),
    /// Play a sequence of computer keys on the virtual keyboard and print the MIDI messages.
    Keys(KeysArgs),
}

#[derive(Parser, Debug)]
struct ImageArgs {
    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Filter name, e.g. `negation`, `blur`, `auto-contrast`.
    #[arg(long)]
    filter: String,

    /// Filter parameters as a JSON object.
    #[arg(long, default_value = "{}")]
    params: String,
}

#[derive(Parser, Debug)]
struct SynthArgs {
    /// Waveform name, e.g. `sine-time`, `karplus-strong`, `fm`.
    #[arg(long)]
    waveform: String,

    /// Waveform parameters as a JSON object.
    #[arg(long, default_value = "{}")]
    params: String,

    /// Fundamental frequency in Hz.
    #[arg(long, default_value_t = 440.0)]
    frequency: f64,

    /// Peak amplitude.
    #[arg(long, default_value_t = 1.0)]
    amp: f64,

    /// Duration in seconds.
    #[arg(long, default_value_t = 1.0)]
    duration: f64,

    #[arg(long, default_value_t = medialab::DEFAULT_SAMPLE_RATE)]
    sample_rate: u32,

    /// Duplicate the signal into a second channel.
    #[arg(long, default_value_t = false)]
    stereo: bool,

    /// Seed for noise-based waveforms.
    #[arg(long)]
    seed: Option<u64>,

    /// Post-processing passes as a JSON array, e.g. `[{"effect":"boost"}]`.
    #[arg(long, default_value = "[]")]
    post: String,

    /// Output path for interleaved little-endian f32 samples.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct VideoArgs {
    /// Effect name, e.g. `reverse`, `fade-in-out`, `cross-fade`, `chroma-key`.
    #[arg(long)]
    effect: String,

    /// Effect parameters as a JSON object.
    #[arg(long, default_value = "{}")]
    params: String,

    /// Directory of input frames, ordered by file name.
    #[arg(long = "in")]
    in_dir: PathBuf,

    /// Second input directory (cross-fade target, chroma-key background).
    #[arg(long = "in2")]
    in2_dir: Option<PathBuf>,

    /// Output directory for `frame_000000.png`, ...
    #[arg(long)]
    out: PathBuf,

    #[arg(long, default_value_t = 30)]
    fps: u32,
}

#[derive(Parser, Debug)]
struct KeysArgs {
    /// Keys to press and release in order, e.g. `zxcv`.
    keys: String,

    /// Pitch of the lowest key.
    #[arg(long, default_value_t = 60)]
    lowest: u8,

    #[arg(long, default_value_t = 80)]
    velocity: u8,

    /// `single`, `major` or `minor`.
    #[arg(long, default_value = "single")]
    mode: String,

    /// 1-based General MIDI instrument number.
    #[arg(long)]
    instrument: Option<u8>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Image(args) => cmd_image(args),
        Command::Synth(args) => cmd_synth(args),
        Command::Video(args) => cmd_video(args),
        Command::Keys(args) => cmd_keys(args),
    }
}

fn cmd_image(args: ImageArgs) -> anyhow::Result<()> {
    let params = medialab::parse_params(&args.params)?;
    let filter = medialab::parse_filter(&args.filter, &params)?;

    let input = image::open(&args.in_path)
        .with_context(|| format!("read image '{}'", args.in_path.display()))?
        .into_rgba8();
    let output = medialab::apply_filter(&filter, &medialab::PixelBuffer::from(input))?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::RgbaImage::try_from(output)?
        .save_with_format(&args.out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("{}: wrote {}", filter.name(), args.out.display());
    Ok(())
}

fn cmd_synth(args: SynthArgs) -> anyhow::Result<()> {
    let params = medialab::parse_params(&args.params)?;
    let waveform = medialab::Waveform::parse(&args.waveform, &params)?;
    let post: serde_json::Value =
        serde_json::from_str(&args.post).context("parse --post as JSON")?;
    let passes = medialab::parse_post_chain(&post)?;

    let mut synth = match args.seed {
        Some(seed) => medialab::Synth::with_seed(args.sample_rate, seed)?,
        None => medialab::Synth::new(args.sample_rate)?,
    };
    let mono = synth.generate(&waveform, args.frequency, args.amp, args.duration)?;

    let mut channels = vec![mono];
    if args.stereo {
        let left = &channels[0];
        let right = medialab::SampleBuffer::new(left.samples().to_vec(), left.sample_rate(), 1)?;
        channels.push(right);
    }
    medialab::apply_passes(&mut channels, &passes)?;

    let interleaved = medialab::interleave(&channels)?;
    medialab::write_samples_f32le(&interleaved, &args.out)?;

    eprintln!(
        "{}: {} samples x {} channel(s) at {} Hz -> {}",
        waveform.name(),
        channels[0].len(),
        channels.len(),
        args.sample_rate,
        args.out.display()
    );
    Ok(())
}

fn cmd_video(args: VideoArgs) -> anyhow::Result<()> {
    let params = medialab::parse_params(&args.params)?;
    let effect = medialab::FrameEffect::parse(&args.effect, &params)?;
    let fps = medialab::Fps::new(args.fps, 1)?;

    let mut input1 = medialab::ImageDirSource::open(&args.in_dir)?;
    let mut input2 = args
        .in2_dir
        .as_deref()
        .map(medialab::ImageDirSource::open)
        .transpose()?;

    let mut sink = medialab::PngSequenceSink::new(&args.out);
    let mut last_reported = -1i64;
    let mut progress = |percent: f64| {
        let whole = percent.floor() as i64;
        if whole != last_reported {
            last_reported = whole;
            eprint!("\r{}: {whole:3}%", effect.name());
        }
    };

    let mut driver = medialab::SequentialDriver::new(fps);
    let outcome = driver.apply(
        &effect,
        &mut input1,
        input2
            .as_mut()
            .map(|s| s as &mut dyn medialab::FrameSource),
        &mut progress,
        &mut sink,
    )?;
    eprintln!();

    match outcome {
        medialab::RunOutcome::Completed { frames } => {
            eprintln!("wrote {frames} frames to {}", args.out.display());
        }
        medialab::RunOutcome::Cancelled { completed } => {
            anyhow::bail!("cancelled after {completed} frames");
        }
    }
    Ok(())
}

fn cmd_keys(args: KeysArgs) -> anyhow::Result<()> {
    let mut keyboard = medialab::VirtualKeyboard::open(medialab::MidiRecorder::new())?;
    keyboard.set_lowest_pitch(args.lowest)?;
    keyboard.set_velocity(args.velocity)?;
    keyboard.set_mode(medialab::PlayMode::parse(&args.mode)?);
    if let Some(n) = args.instrument {
        keyboard.select_instrument(n)?;
    }

    for key in args.keys.chars() {
        if !keyboard.key_down(key)? {
            eprintln!("skipping '{key}': not a keyboard key");
            continue;
        }
        keyboard.key_up(key)?;
    }

    for event in keyboard.into_output().events() {
        println!("{}", serde_json::to_string(event)?);
    }
    Ok(())
}
