use crate::foundation::error::{FramewireError, FramewireResult};
use crate::wire::scanner::{CLOSE_MARKER, OPEN_MARKER};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::RgbImage;

/// Decoded length that classifies a payload as the end-of-stream sentinel.
///
/// The sentinel is identified purely by this length; there is no structural
/// distinction from a malformed data frame. The external renderer defines the
/// format, so this cannot be hardened on the consuming side without
/// desynchronizing the two ends.
pub const SENTINEL_LEN: usize = 4;

/// Byte length of the width/height header preceding pixel data.
const HEADER_LEN: usize = 8;

/// One decoded payload unit from the wire format.
#[derive(Clone, Debug)]
pub enum Frame {
    /// Reserved 4-byte payload terminating the logical stream. Never
    /// forwarded downstream.
    Sentinel,
    /// A frame carrying image data.
    Data(FrameRgb),
}

/// A decoded frame as RGB8 pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRgb {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGB8 bytes, tightly packed, row-major, top row first.
    pub data: Vec<u8>,
}

impl FrameRgb {
    /// Materialize the pixel buffer into an addressable image.
    pub fn into_image(self) -> FramewireResult<RgbImage> {
        let (width, height) = (self.width, self.height);
        RgbImage::from_raw(width, height, self.data).ok_or_else(|| {
            FramewireError::frame_size(format!(
                "pixel buffer does not match {width}x{height} RGB dimensions"
            ))
        })
    }
}

/// Decode one payload string into a [`Frame`].
///
/// ASCII whitespace inside the payload is ignored, so line-wrapped producer
/// output decodes the same as a contiguous payload.
pub fn decode_payload(payload: &str) -> FramewireResult<Frame> {
    let cleaned: String = payload
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let raw = BASE64
        .decode(cleaned.as_bytes())
        .map_err(|e| FramewireError::decode(format!("invalid base64 payload: {e}")))?;

    if raw.len() == SENTINEL_LEN {
        return Ok(Frame::Sentinel);
    }
    if raw.len() < HEADER_LEN {
        return Err(FramewireError::frame_size(format!(
            "payload decodes to {} bytes, shorter than the {HEADER_LEN}-byte header",
            raw.len()
        )));
    }

    let mut w = [0u8; 4];
    let mut h = [0u8; 4];
    w.copy_from_slice(&raw[0..4]);
    h.copy_from_slice(&raw[4..8]);
    let width = u32::from_le_bytes(w);
    let height = u32::from_le_bytes(h);

    // width*height*3 can exceed u64 for hostile headers; the mismatch must
    // surface as FrameSize, not an arithmetic overflow.
    let expected = (width as u128) * (height as u128) * 3;
    let actual = (raw.len() - HEADER_LEN) as u128;
    if expected != actual {
        return Err(FramewireError::frame_size(format!(
            "frame declares {width}x{height} ({expected} pixel bytes) but carries {actual}"
        )));
    }

    Ok(Frame::Data(FrameRgb {
        width,
        height,
        data: raw[HEADER_LEN..].to_vec(),
    }))
}

/// Encode a frame into its `<<<base64>>>` wire representation.
pub fn encode_frame(frame: &FrameRgb) -> FramewireResult<String> {
    let expected = (frame.width as u128) * (frame.height as u128) * 3;
    if frame.data.len() as u128 != expected {
        return Err(FramewireError::frame_size(format!(
            "frame declares {}x{} ({expected} pixel bytes) but carries {}",
            frame.width,
            frame.height,
            frame.data.len()
        )));
    }

    let mut raw = Vec::with_capacity(HEADER_LEN + frame.data.len());
    raw.extend_from_slice(&frame.width.to_le_bytes());
    raw.extend_from_slice(&frame.height.to_le_bytes());
    raw.extend_from_slice(&frame.data);
    Ok(format!("{OPEN_MARKER}{}{CLOSE_MARKER}", BASE64.encode(&raw)))
}

/// Encode the end-of-stream terminator.
pub fn encode_sentinel() -> String {
    format!(
        "{OPEN_MARKER}{}{CLOSE_MARKER}",
        BASE64.encode([0u8; SENTINEL_LEN])
    )
}
