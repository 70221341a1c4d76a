//! teemock: batch shirt mockup generator.
//!
//! Composites every graphic onto every garment photograph and writes the
//! results as PNG files into a directory or a zip archive, either flat or
//! grouped by graphic.
//!
//! # Usage
//!
//! ```text
//! teemock batch --graphic logo.png --graphic wave.png \
//!     --garment plain_white.jpg --garment model_front.jpg --out mockups/
//! teemock batch --graphic logo.png --garment plain_white.jpg \
//!     --archive all_mockups.zip --layout zip-per-graphic
//! teemock preview --graphic logo.png --garment model_front.jpg \
//!     --out preview.png --at 120,340
//! ```
//!
//! Garments whose file stem contains `model` use the model placement
//! profile; all others use the plain profile.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use teemock_export::{ArchiveEntry, ArchiveLayout};
use teemock_pipeline::{
    BatchOptions, BlendMode, ConfigResolver, MockupSettings, PlacementConfig, PlacementProfiles,
    Source,
};

/// Batch shirt mockup generator.
#[derive(Parser)]
#[command(name = "teemock", version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render every graphic onto every garment and write the mockups.
    Batch(BatchArgs),
    /// Render one graphic onto one garment.
    Preview(PreviewArgs),
}

#[derive(Args)]
struct BatchArgs {
    /// Graphic image (PNG with transparency recommended). Repeatable.
    #[arg(long = "graphic", required = true)]
    graphics: Vec<PathBuf>,

    /// Garment photograph on a light backdrop. Repeatable.
    #[arg(long = "garment", required = true)]
    garments: Vec<PathBuf>,

    /// Output directory. Created if missing.
    #[arg(long, required_unless_present = "archive")]
    out: Option<PathBuf>,

    /// Write a single zip archive here instead of a directory.
    #[arg(long, conflicts_with = "out")]
    archive: Option<PathBuf>,

    /// Custom display name for a graphic, as `FILE=NAME` (file name or stem).
    #[arg(long = "name", value_parser = parse_name)]
    names: Vec<(String, String)>,

    /// First graphic to render (1-based, inclusive).
    #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    start: Option<usize>,

    /// Last graphic to render (1-based, inclusive).
    #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    end: Option<usize>,

    /// Output arrangement.
    #[arg(long, value_enum, default_value_t = Layout::Flat)]
    layout: Layout,

    /// Worker threads (default: one per core).
    #[arg(long)]
    threads: Option<usize>,

    #[command(flatten)]
    render: RenderArgs,
}

#[derive(Args)]
struct PreviewArgs {
    /// Graphic image.
    #[arg(long)]
    graphic: PathBuf,

    /// Garment photograph.
    #[arg(long)]
    garment: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Explicit top-left corner `X,Y` for the graphic, replacing the
    /// solved position.
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    at: Option<(i64, i64)>,

    #[command(flatten)]
    render: RenderArgs,
}

/// Placement and blending parameters shared by both commands.
///
/// Placement flags come in `--plain-*` / `--model-*` pairs, one per
/// garment class.
#[derive(Args)]
struct RenderArgs {
    /// Fraction of the detected garment the graphic may occupy on plain garments (0-1].
    #[arg(long, default_value_t = PlacementConfig::DEFAULT_PADDING_RATIO)]
    plain_padding_ratio: f64,

    /// Vertical offset for plain garments, % of detected height.
    #[arg(long, default_value_t = PlacementConfig::DEFAULT_PLAIN_VERTICAL_OFFSET_PCT, allow_hyphen_values = true)]
    plain_offset: f64,

    /// Horizontal shift from centre on plain garments, % of detected width.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    plain_horizontal_offset: f64,

    /// Horizontal skew in degrees on plain garments.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    plain_skew_x: f64,

    /// Vertical skew in degrees on plain garments.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    plain_skew_y: f64,

    /// Fraction of the detected garment the graphic may occupy on model-worn garments (0-1].
    #[arg(long, default_value_t = PlacementConfig::DEFAULT_PADDING_RATIO)]
    model_padding_ratio: f64,

    /// Vertical offset for model-worn garments, % of detected height.
    #[arg(long, default_value_t = PlacementConfig::DEFAULT_MODEL_VERTICAL_OFFSET_PCT, allow_hyphen_values = true)]
    model_offset: f64,

    /// Horizontal shift from centre on model-worn garments, % of detected width.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    model_horizontal_offset: f64,

    /// Horizontal skew in degrees on model-worn garments.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    model_skew_x: f64,

    /// Vertical skew in degrees on model-worn garments.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    model_skew_y: f64,

    /// Full placement profiles as a JSON string.
    ///
    /// When provided, all placement flags above are ignored. The JSON
    /// must be a `PlacementProfiles` serialization; missing fields take
    /// their defaults.
    #[arg(long)]
    profiles_json: Option<String>,

    /// Maximum wrinkle displacement in pixels (0 disables the warp).
    #[arg(long, default_value_t = MockupSettings::DEFAULT_WARP_INTENSITY)]
    warp_intensity: f64,

    /// Graphic opacity (0-1), used by the `auto` blend.
    #[arg(long, default_value_t = MockupSettings::DEFAULT_OPACITY)]
    opacity: f64,

    /// Blend policy.
    #[arg(long, value_enum, default_value_t = Blend::Multiply)]
    blend: Blend,
}

/// Output arrangement selection.
#[derive(Clone, Copy, ValueEnum)]
enum Layout {
    /// All files in the output directory.
    Flat,
    /// One sub-directory per graphic.
    ByGraphic,
    /// One zip per graphic.
    ZipPerGraphic,
}

impl From<Layout> for ArchiveLayout {
    fn from(layout: Layout) -> Self {
        match layout {
            Layout::Flat => Self::Flat,
            Layout::ByGraphic => Self::ByGraphic,
            Layout::ZipPerGraphic => Self::ZipPerGraphic,
        }
    }
}

/// Blend policy selection.
#[derive(Clone, Copy, ValueEnum)]
enum Blend {
    /// Multiply, pasted through the graphic's alpha.
    Multiply,
    /// Multiply on light fabric, screen on dark fabric.
    Auto,
}

impl From<Blend> for BlendMode {
    fn from(blend: Blend) -> Self {
        match blend {
            Blend::Multiply => Self::MultiplyPaste,
            Blend::Auto => Self::Auto,
        }
    }
}

impl RenderArgs {
    fn profiles(&self) -> Result<PlacementProfiles, String> {
        if let Some(json) = &self.profiles_json {
            return serde_json::from_str(json).map_err(|e| format!("invalid --profiles-json: {e}"));
        }
        Ok(PlacementProfiles {
            model: PlacementConfig {
                padding_ratio: self.model_padding_ratio,
                vertical_offset_pct: self.model_offset,
                horizontal_offset_pct: self.model_horizontal_offset,
                skew_x_deg: self.model_skew_x,
                skew_y_deg: self.model_skew_y,
            },
            plain: PlacementConfig {
                padding_ratio: self.plain_padding_ratio,
                vertical_offset_pct: self.plain_offset,
                horizontal_offset_pct: self.plain_horizontal_offset,
                skew_x_deg: self.plain_skew_x,
                skew_y_deg: self.plain_skew_y,
            },
        })
    }

    fn settings(&self) -> MockupSettings {
        MockupSettings {
            warp_intensity: self.warp_intensity,
            opacity: self.opacity,
            blend_mode: self.blend.into(),
        }
    }
}

fn parse_name(s: &str) -> Result<(String, String), String> {
    let (file, name) = s
        .split_once('=')
        .ok_or_else(|| format!("expected FILE=NAME, got {s:?}"))?;
    if file.is_empty() || name.trim().is_empty() {
        return Err(format!("expected FILE=NAME, got {s:?}"));
    }
    Ok((file.to_string(), name.trim().to_string()))
}

fn parse_point(s: &str) -> Result<(i64, i64), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got {s:?}"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<i64>()
            .map_err(|e| format!("invalid coordinate {v:?}: {e}"))
    };
    Ok((parse(x)?, parse(y)?))
}

/// File stem used as the input's identifier.
fn stem(path: &Path) -> String {
    path.file_stem()
        .map_or_else(|| path.display().to_string(), |s| s.to_string_lossy().into_owned())
}

fn read_source(path: &Path) -> Result<Source, String> {
    let bytes =
        std::fs::read(path).map_err(|e| format!("Error reading {}: {e}", path.display()))?;
    Ok(Source::new(stem(path), bytes))
}

/// Custom name for a graphic: matched by full file name, then by stem.
fn custom_name<'a>(path: &Path, names: &'a [(String, String)]) -> Option<&'a str> {
    let file_name = path.file_name().map(|s| s.to_string_lossy());
    let stem = stem(path);
    names
        .iter()
        .find(|(key, _)| file_name.as_deref() == Some(key.as_str()))
        .or_else(|| names.iter().find(|(key, _)| *key == stem))
        .map(|(_, name)| name.as_str())
}

/// Resolve the 1-based inclusive `--start/--end` window to a slice range.
fn graphic_range(
    start: Option<usize>,
    end: Option<usize>,
    count: usize,
) -> Result<std::ops::Range<usize>, String> {
    let start = start.unwrap_or(1);
    let end = end.unwrap_or(count);
    if start > end || end > count {
        return Err(format!(
            "invalid graphic range {start}..={end} for {count} graphic(s)"
        ));
    }
    Ok(start - 1..end)
}

fn run_batch(args: &BatchArgs) -> Result<(), String> {
    let profiles = args.render.profiles()?;
    let settings = args.render.settings();
    let options = BatchOptions {
        threads: args.threads,
    };
    teemock_pipeline::batch::validate(&profiles, &settings, &options).map_err(|e| e.to_string())?;

    let range = graphic_range(args.start, args.end, args.graphics.len())?;
    let graphics = args.graphics[range]
        .iter()
        .map(|path| {
            let source = read_source(path)?;
            Ok(match custom_name(path, &args.names) {
                Some(name) => source.with_label(name),
                None => source,
            })
        })
        .collect::<Result<Vec<_>, String>>()?;
    let garments = args
        .garments
        .iter()
        .map(|path| read_source(path))
        .collect::<Result<Vec<_>, String>>()?;

    let report = teemock_pipeline::batch::run(&graphics, &garments, &profiles, &settings, &options)
        .map_err(|e| format!("Pipeline error: {e}"))?;

    let entries = teemock_export::archive_entries(&report.results, args.layout.into())
        .map_err(|e| e.to_string())?;
    let destination = match (&args.archive, &args.out) {
        (Some(archive), _) => {
            write_archive(archive, &entries)?;
            archive
        }
        (None, Some(out)) => {
            write_directory(out, &entries)?;
            out
        }
        (None, None) => return Err("either --out or --archive is required".to_string()),
    };

    for failure in &report.failures {
        eprintln!("skipped {failure}");
    }
    tracing::info!(
        written = entries.len(),
        bytes = teemock_export::total_bytes(&entries),
        skipped = report.failures.len(),
        out = %destination.display(),
        "mockups written",
    );
    Ok(())
}

/// Write each entry as a file below `out`, creating directories as needed.
fn write_directory(out: &Path, entries: &[ArchiveEntry]) -> Result<(), String> {
    for entry in entries {
        let path = out.join(&entry.path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Error creating {}: {e}", parent.display()))?;
        }
        std::fs::write(&path, &entry.bytes)
            .map_err(|e| format!("Error writing {}: {e}", path.display()))?;
        println!("{}", path.display());
    }
    Ok(())
}

/// Write every entry into one zip archive at `path`.
fn write_archive(path: &Path, entries: &[ArchiveEntry]) -> Result<(), String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Error creating {}: {e}", parent.display()))?;
    }
    let file = std::fs::File::create(path)
        .map_err(|e| format!("Error creating {}: {e}", path.display()))?;
    teemock_export::write_zip(entries, std::io::BufWriter::new(file))
        .and_then(|mut writer| Ok(std::io::Write::flush(&mut writer)?))
        .map_err(|e| format!("Error writing {}: {e}", path.display()))?;
    println!("{}", path.display());
    Ok(())
}

fn run_preview(args: &PreviewArgs) -> Result<(), String> {
    let profiles = args.render.profiles()?;
    let settings = args.render.settings();
    teemock_pipeline::batch::validate(&profiles, &settings, &BatchOptions::default())
        .map_err(|e| e.to_string())?;

    let graphic = read_source(&args.graphic)?;
    let garment = read_source(&args.garment)?;
    let graphic_image = teemock_pipeline::grayscale::decode_graphic(&graphic.bytes)
        .map_err(|e| format!("{}: {e}", args.graphic.display()))?;
    let garment_image = teemock_pipeline::grayscale::decode_garment(&garment.bytes)
        .map_err(|e| format!("{}: {e}", args.garment.display()))?;

    let config = profiles.resolve(&garment.id);
    tracing::debug!(
        garment = %garment.id,
        class = %teemock_pipeline::classify(&garment.id),
        "resolved placement profile",
    );
    let mockup = teemock_pipeline::compose(&garment_image, &graphic_image, config, &settings, args.at);

    let bytes = teemock_export::encode_png(&mockup.image).map_err(|e| e.to_string())?;
    std::fs::write(&args.out, &bytes)
        .map_err(|e| format!("Error writing {}: {e}", args.out.display()))?;

    let p = mockup.placement;
    eprintln!(
        "placed {}x{} at ({}, {}), scale {:.3}{}{}",
        p.width,
        p.height,
        p.x,
        p.y,
        p.scale,
        if mockup.warped { "" } else { ", unwarped" },
        if mockup.truncated { ", truncated" } else { "" },
    );
    if mockup.silhouette.is_none() {
        eprintln!("no garment silhouette found; graphic centred on the full image");
    }
    println!("{}", args.out.display());
    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match &cli.command {
        Command::Batch(args) => run_batch(args),
        Command::Preview(args) => run_preview(args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("{msg}");
            ExitCode::FAILURE
        }
    }
}
