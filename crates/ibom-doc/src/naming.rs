//! Output file naming.

use std::path::Path;

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::Metadata;

static ILLEGAL_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[/\\?%*:|"<>]"#).expect("valid regex"));

/// Expand a name template.
///
/// | token | replacement |
/// |---|---|
/// | `%f` | board file name without extension |
/// | `%p` | title |
/// | `%c` | company |
/// | `%r` | revision |
/// | `%d` | board date, `:` replaced by `-` |
/// | `%D` | generation date, `YYYY-MM-DD` |
/// | `%T` | generation time, `HH-MM-SS` |
///
/// Characters that are illegal in file names become `_`. The result has no
/// extension.
pub fn bom_file_name(
    format: &str,
    pcb_file: &Path,
    metadata: &Metadata,
    now: &NaiveDateTime,
) -> String {
    let stem = pcb_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = format
        .replace("%f", &stem)
        .replace("%p", &metadata.title)
        .replace("%c", &metadata.company)
        .replace("%r", &metadata.revision)
        .replace("%d", &metadata.date.replace(':', "-"))
        .replace("%D", &now.format("%Y-%m-%d").to_string())
        .replace("%T", &now.format("%H-%M-%S").to_string());
    ILLEGAL_CHARS.replace_all(&name, "_").into_owned()
}
