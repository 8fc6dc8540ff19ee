use clap::{Parser, Subcommand};
use retouch::batch::{self, BatchJob};
use retouch::export::ExportParams;
use retouch::imaging::{CropInsets, ExportFormat, Quality, estimate_size};
use retouch::output;
use retouch::presets::{apply_preset, presets};
use retouch::settings::{self, ColorMode, Settings};
use std::path::PathBuf;

/// Flags that build the adjustment settings.
#[derive(clap::Args, Clone)]
struct SettingsArgs {
    /// Settings file (.toml or .json); repeat to layer several, later files win
    #[arg(long = "settings", value_name = "FILE")]
    settings_files: Vec<PathBuf>,

    /// Override one setting, e.g. --set contrast=20 --set color_mode=sepia
    #[arg(long = "set", value_name = "KEY=VALUE")]
    assignments: Vec<String>,

    /// Start from a preset (see `retouch presets`); files and --set apply on top
    #[arg(long)]
    preset: Option<String>,

    /// Convert to grayscale
    #[arg(long)]
    grayscale: bool,

    /// Threshold to pure black and white (wins over --grayscale and --sepia)
    #[arg(long)]
    black_white: bool,

    /// Sepia tone
    #[arg(long)]
    sepia: bool,

    /// Invert colors
    #[arg(long)]
    invert: bool,
}

/// Output size, crop and encoding.
#[derive(clap::Args, Clone)]
struct ExportArgs {
    /// Output format: png, jpeg, webp, avif or bmp
    #[arg(long, default_value = "png")]
    format: String,

    /// Quality for lossy formats, 0.0 to 1.0
    #[arg(long, default_value_t = 0.92)]
    quality: f32,

    /// Output width in pixels; height follows the aspect ratio unless given
    #[arg(long)]
    width: Option<u32>,

    /// Output height in pixels; width follows the aspect ratio unless given
    #[arg(long)]
    height: Option<u32>,

    /// Percent trimmed from the top edge
    #[arg(long, default_value_t = 0.0)]
    crop_top: f32,

    /// Percent trimmed from the bottom edge
    #[arg(long, default_value_t = 0.0)]
    crop_bottom: f32,

    /// Percent trimmed from the left edge
    #[arg(long, default_value_t = 0.0)]
    crop_left: f32,

    /// Percent trimmed from the right edge
    #[arg(long, default_value_t = 0.0)]
    crop_right: f32,
}

#[derive(Parser)]
#[command(name = "retouch")]
#[command(about = "Photo adjustments from the command line")]
#[command(long_about = "\
Photo adjustments from the command line

Settings are layered, later layers win:

  preset (--preset)  →  settings files (--settings)  →  --set key=value  →  flags

Geometry runs before adjustments, adjustments run in a fixed order:

  rotate → flip → resize → crop
  blur → exposure → brightness → contrast → temperature → saturation →
  hue → sharpness → color mode → invert → noise → vignette

Run 'retouch gen-config' to generate a documented settings file.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Adjust images and write them to an output directory
    Apply {
        /// Source images
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        #[command(flatten)]
        settings: SettingsArgs,

        #[command(flatten)]
        export: ExportArgs,

        /// Output directory
        #[arg(long, default_value = "retouched")]
        out_dir: PathBuf,

        /// Maximum number of images processed in parallel (default: all cores)
        #[arg(long)]
        jobs: Option<usize>,
    },
    /// List the built-in presets
    Presets {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the encoded size of an image in every export format
    Estimate {
        input: PathBuf,

        /// Quality for lossy formats, 0.0 to 1.0
        #[arg(long, default_value_t = 0.92)]
        quality: f32,
    },
    /// Print a stock settings file with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Apply {
            inputs,
            settings,
            export,
            out_dir,
            jobs,
        } => {
            let job = BatchJob {
                settings: resolve(&settings)?,
                params: export_params(&export)?,
                out_dir,
            };
            init_thread_pool(jobs);

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_batch_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let summary = batch::run_batch(&inputs, &job, Some(tx));
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;
            output::print_batch_summary(&summary);

            if summary.failed > 0 {
                return Err(format!("{} of {} images failed", summary.failed, inputs.len()).into());
            }
        }
        Command::Presets { json } => {
            if json {
                println!("{}", output::format_presets_json(presets())?);
            } else {
                output::print_presets(presets());
            }
        }
        Command::Estimate { input, quality } => {
            let bitmap = batch::load_bitmap(&input)?;
            let quality = Quality::new(quality);
            let estimates: Vec<_> = ExportFormat::ALL
                .iter()
                .map(|&format| (format, estimate_size(&bitmap, format, quality)))
                .collect();
            output::print_estimates(&input, bitmap.dimensions(), quality, &estimates);
        }
        Command::GenConfig => {
            print!("{}", settings::stock_settings_toml());
        }
    }

    Ok(())
}

/// Build settings from preset, files, assignments and flags, in that order.
fn resolve(args: &SettingsArgs) -> Result<Settings, Box<dyn std::error::Error>> {
    let mut layers = Vec::new();
    if let Some(key) = &args.preset {
        let preset = apply_preset(&Settings::default(), key)?;
        layers.push(toml::Value::try_from(preset)?);
    }
    for path in &args.settings_files {
        layers.push(settings::load_settings_file(path)?);
    }
    for assignment in &args.assignments {
        layers.push(settings::parse_assignment(assignment)?);
    }

    let mut flags = toml::Table::new();
    let mode = ColorMode::from_flags(args.grayscale, args.black_white, args.sepia);
    if mode != ColorMode::None {
        flags.insert("color_mode".into(), toml::Value::String(mode.label().into()));
    }
    if args.invert {
        flags.insert("invert".into(), toml::Value::Boolean(true));
    }
    layers.push(toml::Value::Table(flags));

    Ok(settings::resolve_settings(layers)?)
}

fn export_params(args: &ExportArgs) -> Result<ExportParams, Box<dyn std::error::Error>> {
    Ok(ExportParams {
        format: ExportFormat::parse(&args.format)?,
        quality: Quality::new(args.quality),
        width: args.width,
        height: args.height,
        crop: CropInsets {
            top: args.crop_top,
            bottom: args.crop_bottom,
            left: args.crop_left,
            right: args.crop_right,
        },
        filename: String::new(),
    })
}

/// Initialize the rayon thread pool from `--jobs`.
///
/// Caps at the number of available CPU cores; the user can constrain down, not up.
fn init_thread_pool(jobs: Option<usize>) {
    let threads = batch::effective_threads(jobs);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
