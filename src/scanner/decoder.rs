use tracing::debug;

/// A decoded code: its text payload and the four corners it was found at,
/// in frame pixel coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub payload: String,
    pub corners: [(i32, i32); 4],
}

/// Pure function from an RGBA frame to an optional decode.
pub trait Decoder: Send + Sync {
    fn decode(&self, rgba: &[u8], width: u32, height: u32) -> Option<Decoded>;
}

/// QR decoder built on `rqrr`.
#[derive(Debug, Clone, Copy, Default)]
pub struct QrDecoder;

/// Rec. 601 luma, integer form.
fn luma(px: &[u8]) -> u8 {
    let (r, g, b) = (px[0] as u32, px[1] as u32, px[2] as u32);
    ((r * 299 + g * 587 + b * 114) / 1000) as u8
}

impl Decoder for QrDecoder {
    fn decode(&self, rgba: &[u8], width: u32, height: u32) -> Option<Decoded> {
        let (w, h) = (width as usize, height as usize);
        if w == 0 || h == 0 || rgba.len() < w * h * 4 {
            return None;
        }

        let grey: Vec<u8> = rgba.chunks_exact(4).take(w * h).map(luma).collect();
        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(w, h, |x, y| grey[y * w + x]);

        for grid in prepared.detect_grids() {
            match grid.decode() {
                Ok((_meta, payload)) => {
                    let corners = grid.bounds.map(|p| (p.x, p.y));
                    return Some(Decoded { payload, corners });
                }
                Err(e) => debug!(error = ?e, "QR grid found but not decodable"),
            }
        }
        None
    }
}
