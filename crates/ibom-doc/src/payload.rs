//! The `var pcbdata = ...` script that carries the document to the viewer.

use crate::error::DocumentError;
use crate::model::PcbData;

const PREFIX: &str = "var pcbdata = ";
const COMPRESSED_OPEN: &str = "JSON.parse(LZString.decompressFromBase64(\"";
const COMPRESSED_CLOSE: &str = "\"))";

/// Serialize `pcbdata`, LZ-compressed and base64 packed when `compression`
/// is set.
pub fn serialize(pcbdata: &PcbData, compression: bool) -> Result<String, DocumentError> {
    let json = serde_json::to_string(pcbdata)?;
    if compression {
        let packed = ibom_lzstring::compress_to_base64(&json);
        log::debug!(
            "Compressed document from {} to {} bytes",
            json.len(),
            packed.len()
        );
        Ok(format!("{PREFIX}{COMPRESSED_OPEN}{packed}{COMPRESSED_CLOSE}"))
    } else {
        Ok(format!("{PREFIX}{json}"))
    }
}

/// Read back a script written by [`serialize`].
pub fn deserialize(script: &str) -> Result<PcbData, DocumentError> {
    let body = script
        .trim_end()
        .strip_prefix(PREFIX)
        .ok_or(DocumentError::NotAPayload)?;
    let json = match body
        .strip_prefix(COMPRESSED_OPEN)
        .and_then(|rest| rest.strip_suffix(COMPRESSED_CLOSE))
    {
        Some(packed) => ibom_lzstring::decompress_from_base64(packed)?,
        None => body.to_string(),
    };
    Ok(serde_json::from_str(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Metadata;

    fn document() -> PcbData {
        PcbData {
            metadata: Metadata {
                title: "demo".into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_plain_payload() {
        let script = serialize(&document(), false).unwrap();
        insta::assert_snapshot!(
            script,
            @r#"var pcbdata = {"edges":[],"drawings":{"silkscreen":{"F":[],"B":[]},"fabrication":{"F":[],"B":[]}},"footprints":[],"metadata":{"title":"demo","revision":"","company":"","date":""}}"#
        );
        assert_eq!(deserialize(&script).unwrap(), document());
    }

    #[test]
    fn test_compressed_payload() {
        let script = serialize(&document(), true).unwrap();
        assert!(script.starts_with("var pcbdata = JSON.parse(LZString.decompressFromBase64(\""));
        assert!(script.ends_with("\"))"));
        assert_eq!(deserialize(&script).unwrap(), document());
    }

    #[test]
    fn test_not_a_payload() {
        assert!(matches!(
            deserialize("var config = {}"),
            Err(DocumentError::NotAPayload)
        ));
    }
}
