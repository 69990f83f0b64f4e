use clap::{ArgAction, Parser, Subcommand};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use webpify::imaging::{DataUrl, FitMethod, Runtimes, SourceFormat, sniff, transcode};
use webpify::pipeline::{Pipeline, PipelineOptions};
use webpify::{batch, config, output, request};

/// Resize flags shared by commands that convert images.
#[derive(clap::Args, Clone)]
struct ResizeArgs {
    /// Target width in pixels (resizes only together with --height)
    #[arg(long)]
    width: Option<u32>,

    /// Target height in pixels (resizes only together with --width)
    #[arg(long)]
    height: Option<u32>,

    /// How to fit the target box: contain (pad) or stretch
    #[arg(long)]
    fit: Option<FitMethod>,
}

#[derive(Parser)]
#[command(name = "webpify")]
#[command(about = "Convert PNG, JPEG and WebP images to WebP data URLs")]
#[command(long_about = "\
Convert PNG, JPEG and WebP images to WebP data URLs

Input is a base64 data URL (data:image/png;base64,...) read from a file or
stdin, or a raw .png/.jpg/.webp file. Output is always lossless WebP.

Resizing:
  --width W --height H --fit contain   scale to fit inside WxH, pad the rest
  --width W --height H --fit stretch   scale each axis to exactly WxH

Giving only one of --width/--height leaves the image at its source size.

Run 'webpify gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Path to config.toml (built-in defaults when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert one image
    Convert {
        /// Data URL text file or raw image file; '-' or omitted reads stdin
        input: Option<PathBuf>,

        #[command(flatten)]
        resize: ResizeArgs,

        /// Write raw .webp bytes here instead of printing a data URL
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Handle a JSON request body ({"image", "width", "height", "fitMethod"})
    Request {
        /// JSON file; '-' or omitted reads stdin
        body: Option<PathBuf>,
    },
    /// Convert every image under a directory, in parallel
    Batch {
        /// Directory of .png/.jpg/.webp images and .txt data URLs
        input: PathBuf,

        /// Directory that receives the .webp files
        output: PathBuf,

        #[command(flatten)]
        resize: ResizeArgs,
    },
    /// Show how an input would be classified
    Sniff {
        /// Data URL text file; '-' or omitted reads stdin
        input: Option<PathBuf>,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(ExitCode::SUCCESS);
    }

    let config = config::load_config(cli.config.as_deref())?;
    let runtimes = Runtimes::new(config.runtime_settings());
    let pipeline = Pipeline::new(&runtimes, PipelineOptions::from_config(&config));

    match cli.command {
        Command::Convert {
            input,
            resize,
            output: out_path,
        } => {
            let (label, text) = read_image_input(input.as_deref())?;
            let spec = pipeline.resize_spec(resize.width, resize.height, resize.fit)?;
            let converted = pipeline.run(&text, spec.as_ref())?;
            match &out_path {
                Some(path) => std::fs::write(path, &converted.bytes)?,
                None => println!("{}", converted.to_data_url()),
            }
            output::print_conversion(&label, &converted, out_path.as_deref());
        }
        Command::Request { body } => {
            let body = read_text(body.as_deref())?;
            match request::handle(&pipeline, &body) {
                Ok(image) => {
                    println!("{}", serde_json::json!({ "image": image.as_str() }));
                }
                Err(err) => {
                    let status = err.status_code();
                    println!(
                        "{}",
                        serde_json::json!({ "status": status, "error": err.to_string() })
                    );
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Command::Batch {
            input,
            output: out_dir,
            resize,
        } => {
            init_thread_pool(&config.processing);
            let spec = pipeline.resize_spec(resize.width, resize.height, resize.fit)?;
            pipeline.runtimes().warm_up()?;
            let outcomes = batch::convert_dir(&pipeline, &input, &out_dir, spec.as_ref())?;
            output::print_batch_outcomes(&outcomes, &input, &out_dir);
            if outcomes.iter().any(|outcome| outcome.result.is_err()) {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Sniff { input } => {
            let text = DataUrl::new(read_text(input.as_deref())?);
            let declared = sniff::classify(&text);
            let content = transcode::decode_with_limit(&text, pipeline.options().max_input_bytes)
                .map(|bytes| sniff::detect(&bytes));
            output::print_sniff(text.media_type(), &declared, &content);
        }
        // Printed before config loading.
        Command::GenConfig => {}
    }

    Ok(ExitCode::SUCCESS)
}

/// Log level from `-v` count; `RUST_LOG` takes precedence when set.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

/// `None` and `-` both mean stdin.
fn file_arg(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| *p != Path::new("-"))
}

fn read_text(path: Option<&Path>) -> io::Result<String> {
    match file_arg(path) {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

/// Read a convert input and a label for it.
///
/// Files with an image extension are wrapped into a data URL declaring the
/// matching media type; anything else is read as data URL text.
fn read_image_input(path: Option<&Path>) -> io::Result<(String, DataUrl)> {
    let Some(path) = file_arg(path) else {
        return Ok(("<stdin>".to_string(), DataUrl::new(read_text(None)?)));
    };
    let format = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(SourceFormat::from_extension);
    let text = match format {
        Some(format) => transcode::encode(&std::fs::read(path)?, format.mime_type()),
        None => DataUrl::new(std::fs::read_to_string(path)?),
    };
    Ok((path.display().to_string(), text))
}
