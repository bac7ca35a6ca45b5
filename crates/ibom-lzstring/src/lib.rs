//! LZ-String compatible compression.
//!
//! The output is bit-for-bit what the `lz-string` JavaScript library
//! produces, so a page can inflate it with `LZString.decompressFromBase64`.
//! Strings are handled as UTF-16 code units, like JavaScript strings.

mod compress;
mod decompress;

pub use compress::{compress, compress_to_base64};
pub use decompress::{DecompressError, decompress, decompress_from_base64};

/// Base64 alphabet with `=` as the 65th symbol.
pub const BASE64_ALPHABET: &[u8; 65] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/=";

/// Code marking the end of the stream.
const END_OF_STREAM: u32 = 2;
