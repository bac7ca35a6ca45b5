use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use ibom_diagnostics::Diagnostics;
use ibom_doc::generic_json;
use ibom_geom::Side;

use crate::options::BomOptions;

#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum BomFormat {
    #[default]
    Table,
    Json,
}

impl std::fmt::Display for BomFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BomFormat::Table => write!(f, "table"),
            BomFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum Layer {
    #[default]
    Both,
    #[value(name = "F")]
    Front,
    #[value(name = "B")]
    Back,
}

impl Layer {
    fn side(self) -> Option<Side> {
        match self {
            Layer::Both => None,
            Layer::Front => Some(Side::F),
            Layer::Back => Some(Side::B),
        }
    }
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Layer::Both => write!(f, "both"),
            Layer::Front => write!(f, "F"),
            Layer::Back => write!(f, "B"),
        }
    }
}

#[derive(Args, Debug, Clone)]
#[command(about = "Print the Bill of Materials (BOM) of a generic JSON board")]
pub struct BomArgs {
    /// Generic JSON board file
    #[arg(value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub file: PathBuf,

    /// Which side's table to print
    #[arg(short, long, default_value_t = Layer::Both)]
    pub layer: Layer,

    /// Output format
    #[arg(short, long, default_value_t = BomFormat::Table)]
    pub format: BomFormat,

    #[command(flatten)]
    pub bom: BomOptions,
}

pub fn execute(args: BomArgs) -> Result<()> {
    let config = args.bom.load_config(&args.file)?;
    let board = generic_json::read(&args.file)
        .with_context(|| format!("Failed to read board {}", args.file.display()))?;

    let mut diagnostics = Diagnostics::new();
    let bom = ibom_bom::build(
        &board.components,
        &config.bom,
        &config.normalizer,
        &mut diagnostics,
    );
    diagnostics.emit();

    let side = args.layer.side();
    let mut writer = io::stdout().lock();
    match args.format {
        BomFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, bom.rows(side))?;
            writeln!(writer)?;
        }
        BomFormat::Table => bom.write_table(side, writer)?,
    }
    Ok(())
}
