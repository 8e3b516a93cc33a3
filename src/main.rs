use clap::{Parser, Subcommand};
use photo_resize::config;
use photo_resize::imaging::{
    CancelToken, Quality, ResizeFilter, ResizeRequest, RustBackend, inspect_source, resize_file,
};
use photo_resize::output;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "photo-resize")]
#[command(about = "Resize photos with high-quality separable resampling")]
#[command(long_about = "\
Resize photos with high-quality separable resampling

The target size is given as a percentage, explicit pixels (a missing side
keeps the aspect ratio), or the length of the longer edge. Sizes refer to
the upright image: EXIF orientation is applied before resizing and the
output is written upright.

Output format follows the source extension: .png stays PNG, .webp becomes
lossless WebP, everything else (TIFF included) is written as JPEG. An
--output path must carry the matching extension. Allowlisted EXIF tags
(camera, exposure, GPS, dates) are copied into JPEG output.

Examples:
  photo-resize resize IMG_0001.jpg --percent 50
  photo-resize resize IMG_0001.jpg --long-edge 2048 --filter mitchell
  photo-resize resize scan.png --width 800 -o thumb.png
  photo-resize info IMG_0001.jpg

Run 'photo-resize gen-config' to generate a documented photo-resize.toml.")]
#[command(version)]
struct Cli {
    /// Log progress and plan decisions (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: ./photo-resize.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// How big the result should be. Exactly one form is used.
#[derive(clap::Args, Clone)]
struct SizeArgs {
    /// Scale both sides by this percentage (1-100)
    #[arg(long, short = 'p', conflicts_with_all = ["width", "height", "long_edge"])]
    percent: Option<u32>,

    /// Target width in pixels; height follows the aspect ratio unless given
    #[arg(long, short = 'W')]
    width: Option<u32>,

    /// Target height in pixels; width follows the aspect ratio unless given
    #[arg(long, short = 'H')]
    height: Option<u32>,

    /// Target length of the longer side in pixels
    #[arg(long, short = 'l', conflicts_with_all = ["width", "height"])]
    long_edge: Option<u32>,
}

impl SizeArgs {
    fn request(&self) -> Result<ResizeRequest, String> {
        match (self.percent, self.width, self.height, self.long_edge) {
            (Some(p), None, None, None) => Ok(ResizeRequest::Percentage(p)),
            (None, None, None, Some(n)) => Ok(ResizeRequest::LongEdge(n)),
            (None, w, h, None) if w.is_some() || h.is_some() => {
                Ok(ResizeRequest::Pixels { width: w, height: h })
            }
            _ => Err(
                "give one of --percent, --width/--height, or --long-edge".to_string(),
            ),
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Resize one image and write the result next to it (or to --output)
    Resize {
        /// Source image (JPEG, PNG, TIFF or WebP)
        input: PathBuf,

        /// Destination path (default: resized_<name> beside the source)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        #[command(flatten)]
        size: SizeArgs,

        /// Resampling filter, see `photo-resize filters`
        #[arg(long, short = 'f')]
        filter: Option<ResizeFilter>,

        /// JPEG quality (1-100)
        #[arg(long, short = 'q', value_parser = clap::value_parser!(u32).range(1..=100))]
        quality: Option<u32>,

        /// Do not copy EXIF metadata into the output
        #[arg(long)]
        no_metadata: bool,

        /// Always decode at full resolution
        #[arg(long)]
        no_presubsample: bool,

        /// Resample on the calling thread only
        #[arg(long)]
        sequential: bool,

        /// Stretch the kernel over each pixel's source footprint when shrinking
        #[arg(long)]
        widen: bool,
    },
    /// Show stored and upright dimensions, orientation and EXIF tags
    Info {
        /// Source image
        input: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// List available resampling filters
    Filters,
    /// Print a stock photo-resize.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Resize {
            input,
            output: output_path,
            size,
            filter,
            quality,
            no_metadata,
            no_presubsample,
            sequential,
            widen,
        } => {
            let config = config::load_config(cli.config.as_deref())?;
            init_thread_pool(&config.processing);

            let request = size.request()?;
            let mut params = config.resize_params(&input, request)?;
            if let Some(path) = output_path {
                params.output = path;
            }
            if let Some(filter) = filter {
                params.filter = filter;
            }
            if let Some(q) = quality {
                params.quality = Quality::new(q);
            }
            params.keep_metadata &= !no_metadata;
            params.presubsample &= !no_presubsample;
            params.parallel &= !sequential;
            params.widen_on_downscale |= widen;

            match resize_file(&RustBackend::new(), &params, &CancelToken::new()) {
                Ok(report) => output::print_resize_report(&report),
                Err(e) => {
                    eprintln!("{}", output::format_error(&input, &e));
                    std::process::exit(1);
                }
            }
        }
        Command::Info { input, json } => {
            let info = match inspect_source(&RustBackend::new(), &input) {
                Ok(info) => info,
                Err(e) => {
                    eprintln!("{}", output::format_error(&input, &e));
                    std::process::exit(1);
                }
            };
            if json {
                println!("{}", output::format_info_json(&info)?);
            } else {
                output::print_info(&info);
            }
        }
        Command::Filters => {
            output::print_filters();
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Warnings only by default; `-v` adds the per-file summary and plan.
fn init_logging(verbose: bool) {
    let default_level = if verbose {
        "photo_resize=debug"
    } else {
        "photo_resize=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
