//! Factory-default SPI flash firmware generator for DS-family consoles.

use clap::Parser;
use eyre::{Result, WrapErr};
use spi_firmware::Model;
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    color_eyre::install()?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    if args.list_models {
        print_models();
        return Ok(());
    }
    let Some(output) = args.output else {
        eyre::bail!("no output path given");
    };
    let written = engrave(args.model, &output)?;
    tracing::info!("Saved {} ({written} bytes)", output.display());
    Ok(())
}

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path where the firmware image will be written to.
    #[arg(short = 'o', required_unless_present = "list_models")]
    output: Option<PathBuf>,
    /// Console model, by name (ds, lite, dsi, ique, ique-lite) or numeric id.
    #[arg(short, long, default_value = "ds")]
    model: Model,
    /// Print the supported models and exit.
    #[arg(long)]
    list_models: bool,
}

fn print_models() {
    println!("{:<10} {:>2} {:>9} {:>11}", "model", "id", "size", "hardware id");
    for model in Model::ALL {
        println!(
            "{:<10} {:>2} {:>#9x} {:>#11x}",
            model.name(),
            model.id(),
            model.image_size(),
            model.hardware_id()
        );
    }
}

// -- SECTION: Image Generation

/// Synthesize the image for `model`, write it to `output` and check what landed on disk.
/// Returns the number of bytes written.
fn engrave(model: Model, output: &Path) -> Result<usize> {
    let image = spi_firmware::synthesize(model);
    tracing::debug!(%model, len = image.len(), "synthesized firmware image");
    spi_firmware::verify(model, image.as_bytes())
        .wrap_err("synthesized image failed self-check")?;

    write_atomic(output, image.as_bytes())
        .wrap_err_with(|| format!("failed to write {}", output.display()))?;

    let on_disk =
        fs::read(output).wrap_err_with(|| format!("failed to read back {}", output.display()))?;
    spi_firmware::verify(model, &on_disk)
        .wrap_err_with(|| format!("sanity check of {} failed", output.display()))?;
    tracing::debug!("sanity check passed");

    Ok(on_disk.len())
}

// -- SECTION: Filesystem

/// Temporary sibling of `path` that the image is staged in before being renamed into place.
fn staging_path(path: &Path) -> PathBuf {
    let mut staged = OsString::from(path.as_os_str());
    staged.push(".tmp");
    PathBuf::from(staged)
}

/// Write `data` to `path` such that `path` either holds all of `data` or is left untouched.
fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let tmp = staging_path(path);
    let result = fs::write(&tmp, data).and_then(|()| match fs::rename(&tmp, path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::AlreadyExists => {
            fs::remove_file(path)?;
            fs::rename(&tmp, path)
        }
        Err(err) => Err(err),
    });
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}
