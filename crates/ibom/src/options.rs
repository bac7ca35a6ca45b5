use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use ibom_bom::{DecimalSeparator, Field, split_list};
use ibom_doc::Config;

const CONFIG_FILE_NAME: &str = "ibom.toml";

/// BOM options shared by every command. List values are comma separated;
/// write `\,` for a literal comma.
#[derive(Args, Debug, Clone, Default)]
pub struct BomOptions {
    /// Config file [default: ibom.toml next to the board file, if present]
    #[arg(long, value_name = "PATH", value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Reference prefix order, `~` places every other prefix
    #[arg(long, value_name = "LIST")]
    pub sort_order: Option<String>,

    /// References or `PREFIX*` globs to leave out of the BOM
    #[arg(long, value_name = "LIST")]
    pub blacklist: Option<String>,

    /// Keep virtual components in the BOM
    #[arg(long)]
    pub no_blacklist_virtual: bool,

    /// Leave out components with an empty value
    #[arg(long)]
    pub blacklist_empty_val: bool,

    /// Field whose non-empty value marks a part as not populated
    #[arg(long, value_name = "NAME")]
    pub dnp_field: Option<String>,

    /// Field that holds the board variant of each part
    #[arg(long, value_name = "NAME")]
    pub variant_field: Option<String>,

    /// Variants to keep, `<empty>` matches parts without a variant
    #[arg(long, value_name = "LIST")]
    pub variants_whitelist: Option<String>,

    /// Variants to leave out
    #[arg(long, value_name = "LIST")]
    pub variants_blacklist: Option<String>,

    /// Columns of the BOM table
    #[arg(long, value_name = "LIST")]
    pub show_fields: Option<String>,

    /// Columns whose values must match for parts to share a row
    #[arg(long, value_name = "LIST")]
    pub group_fields: Option<String>,

    /// Values use `,` as the decimal separator
    #[arg(long)]
    pub comma_decimal: bool,
}

fn fields(list: &str) -> Vec<Field> {
    split_list(list).into_iter().map(Field::from).collect()
}

impl BomOptions {
    /// Load the config file, then apply the command line on top of it.
    pub fn load_config(&self, pcb_file: &Path) -> Result<Config> {
        let path = self.config.clone().or_else(|| {
            let candidate = pcb_file.parent()?.join(CONFIG_FILE_NAME);
            candidate.is_file().then_some(candidate)
        });
        let mut config = match path {
            Some(path) => Config::load(&path)
                .with_context(|| format!("Failed to load {}", path.display()))?,
            None => Config::default(),
        };
        self.apply(&mut config);
        config.bom.validate().context("Invalid BOM options")?;
        Ok(config)
    }

    fn apply(&self, config: &mut Config) {
        let bom = &mut config.bom;
        if let Some(list) = &self.sort_order {
            bom.sort_order = split_list(list);
        }
        if let Some(list) = &self.blacklist {
            bom.blacklist = split_list(list);
        }
        if self.no_blacklist_virtual {
            bom.blacklist_virtual = false;
        }
        if self.blacklist_empty_val {
            bom.blacklist_empty_val = true;
        }
        if self.dnp_field.is_some() {
            bom.dnp_field = self.dnp_field.clone();
        }
        if self.variant_field.is_some() {
            bom.board_variant_field = self.variant_field.clone();
        }
        if let Some(list) = &self.variants_whitelist {
            bom.board_variant_whitelist = split_list(list);
        }
        if let Some(list) = &self.variants_blacklist {
            bom.board_variant_blacklist = split_list(list);
        }
        if let Some(list) = &self.show_fields {
            bom.show_fields = fields(list);
            if self.group_fields.is_none() {
                bom.group_fields = bom.show_fields.clone();
            }
        }
        if let Some(list) = &self.group_fields {
            bom.group_fields = fields(list);
        }
        if self.comma_decimal {
            config.normalizer.decimal_separator = DecimalSeparator::Comma;
        }
    }
}
