use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Encodes raw document bytes as standard, padded base64 with no data-URI prefix.
pub fn encode_document(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}
