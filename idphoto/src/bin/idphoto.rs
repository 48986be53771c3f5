//! `idphoto`: turn a photo file into a passport-style photo.

use anyhow::{bail, Context, Result};
use clap::Parser;
use idphoto::models::gemini::{models, GeminiImageModel};
use idphoto::models::ApiKey;
use idphoto::{telemetry, EncodedImage, GenerationConfig, GenerationError, Session};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

const KEY_VARS: &[&str] = &["GEMINI_API_KEY", "GOOGLE_API_KEY"];

#[derive(Debug, Parser)]
#[command(name = "idphoto", version, about = "Generate a passport-style photo from a casual one")]
struct Cli {
    /// Source photo (JPEG, PNG, WebP, GIF or BMP).
    input: PathBuf,

    /// Where to write the generated image.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON configuration file. Without it, `IDPHOTO_*` variables apply.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Instruction text replacing the built-in prompt.
    #[arg(long)]
    instructions: Option<String>,

    /// Model name.
    #[arg(long, env = "IDPHOTO_MODEL", default_value = models::DEFAULT)]
    model: String,

    /// Log as JSON lines.
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = telemetry::init_tracing(cli.json_logs) {
        eprintln!("warning: logging disabled: {e}");
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<GenerationError>() {
                Some(generation) => eprintln!("{}", generation.user_message()),
                None => eprintln!("error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => GenerationConfig::from_json_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => GenerationConfig::from_env()?,
    };
    if let Some(instructions) = cli.instructions {
        config = config.with_instructions(instructions);
    }

    let key = ApiKey::from_env(KEY_VARS)?;
    let model = GeminiImageModel::with_key(&cli.model, &key);
    let session = Session::new(model, &config);

    let image = read_image(&cli.input)?;
    let result = session.generate_default(image).await?;

    let generated = result.to_image()?;
    let output = cli
        .output
        .unwrap_or_else(|| default_output(&cli.input, &generated.media_type));
    std::fs::write(&output, generated.decode()?)
        .with_context(|| format!("writing {}", output.display()))?;

    info!(output = %output.display(), "Saved passport photo");
    println!("{}", output.display());
    Ok(())
}

fn read_image(path: &Path) -> Result<EncodedImage> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let Some(media_type) = media_type_for(path) else {
        bail!("unsupported image type: {}", path.display());
    };
    Ok(EncodedImage::from_bytes(&bytes, media_type))
}

fn media_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let media_type = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        _ => return None,
    };
    Some(media_type)
}

fn default_output(input: &Path, media_type: &str) -> PathBuf {
    let ext = match media_type {
        "image/png" => "png",
        "image/webp" => "webp",
        _ => "jpg",
    };
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("photo");
    input.with_file_name(format!("{stem}-passport.{ext}"))
}
