use base64::{engine::general_purpose::STANDARD, Engine as _};

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Invalid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

/// Decode a base64 image, discarding anything up to the first comma
/// (e.g. `data:image/jpeg;base64,`). The prefix itself is not validated.
pub fn decode_image(data: &str) -> Result<Vec<u8>, DecodeError> {
    let payload = match data.split_once(',') {
        Some((_, rest)) => rest,
        None => data,
    };
    Ok(STANDARD.decode(payload)?)
}

/// Keep only the last path component of `raw`, treating both `/` and `\`
/// as separators.
pub fn sanitize_identifier(raw: &str) -> String {
    raw.rsplit(&['/', '\\'][..]).next().unwrap_or_default().to_string()
}
