use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use chrono::{DateTime, Local};
use clap::Args;
use colored::Colorize;
use ibom_doc::{DocumentBuilder, StrokeFont, generic_json, naming, payload};

use crate::options::BomOptions;

#[derive(Args, Debug, Clone)]
#[command(about = "Write the viewer payload for a generic JSON board")]
pub struct GenerateArgs {
    /// Generic JSON board file
    #[arg(value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub file: PathBuf,

    /// Output directory, relative to the board file unless absolute
    #[arg(long, value_name = "DIR")]
    pub dest_dir: Option<PathBuf>,

    /// Output name template (%f, %p, %c, %r, %d, %D, %T)
    #[arg(long, value_name = "FORMAT")]
    pub name_format: Option<String>,

    /// Embed the document as plain JSON
    #[arg(long)]
    pub no_compression: bool,

    /// Keep tracks and zones in the document
    #[arg(long)]
    pub include_tracks: bool,

    /// Keep the net list in the document
    #[arg(long)]
    pub include_nets: bool,

    /// Stroke font glyph table (JSON array of encoded glyphs)
    #[arg(long, value_name = "PATH", value_hint = clap::ValueHint::FilePath)]
    pub font: Option<PathBuf>,

    #[command(flatten)]
    pub bom: BomOptions,
}

fn load_font(path: &PathBuf) -> Result<StrokeFont> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    StrokeFont::from_json(&text).with_context(|| format!("Invalid font table {}", path.display()))
}

pub fn execute(args: GenerateArgs) -> Result<()> {
    let mut config = args.bom.load_config(&args.file)?;
    if let Some(dir) = &args.dest_dir {
        config.bom_dest_dir = dir.clone();
    }
    if let Some(format) = &args.name_format {
        config.bom_name_format = format.clone();
    }
    config.compression &= !args.no_compression;
    config.include_tracks |= args.include_tracks;
    config.include_nets |= args.include_nets;

    let font = args.font.as_ref().map(load_font).transpose()?;

    let mut board = generic_json::read(&args.file).with_context(|| {
        format!(
            "{} does not appear to be a valid generic InteractiveHtmlBom JSON file",
            args.file.display()
        )
    })?;
    let modified = fs::metadata(&args.file)
        .and_then(|meta| meta.modified())
        .ok()
        .map(DateTime::<Local>::from);
    board.pcbdata.metadata.fill_defaults(&args.file, modified);

    let mut builder = DocumentBuilder::new(&config);
    if let Some(font) = &font {
        builder = builder.with_font(font);
    }
    let result = builder.build(board.pcbdata, &board.components);
    result.diagnostics.emit();
    let document = result
        .output_result()
        .map_err(|_| anyhow::anyhow!("Failed to build {}", args.file.display()))?;

    let dir = config.output_dir(&args.file);
    fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    let name = naming::bom_file_name(
        &config.bom_name_format,
        &args.file,
        &document.metadata,
        &Local::now().naive_local(),
    );
    let path = dir.join(format!("{name}.js"));

    let script = payload::serialize(&document, config.compression)?;
    AtomicFile::new(&path, OverwriteBehavior::AllowOverwrite)
        .write(|f| {
            f.write_all(script.as_bytes())?;
            f.write_all(b"\n")?;
            f.flush()
        })
        .map_err(|err| anyhow::anyhow!("Failed to write {}: {err}", path.display()))?;

    log::info!("Created file {}", path.display());
    println!("{} {}", "Created".green(), path.display());
    Ok(())
}
