use serde::{Deserialize, Serialize};

use crate::bitmap::{decode_bitmap, encode_bitmap};
use crate::error::FetchError;

/// Path segment of the fractal endpoint, relative to the viewer page.
pub const FRACTAL_ENDPOINT: &str = "fractal";

/// Snapshot of the view parameters sent to the renderer.
///
/// Serializes to the endpoint's query-string names; the server parses its
/// query with the same type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FractalRequest {
    #[serde(rename = "centerx")]
    pub center_x: f64,
    #[serde(rename = "centery")]
    pub center_y: f64,
    pub zoom: f64,
    #[serde(rename = "resx")]
    pub res_x: u32,
    #[serde(rename = "resy")]
    pub res_y: u32,
}

impl FractalRequest {
    pub fn pixel_count(&self) -> usize {
        self.res_x as usize * self.res_y as usize
    }

    /// Query string in the fixed order `centerx, centery, zoom, resx, resy`.
    pub fn to_query(&self) -> String {
        format!(
            "centerx={}&centery={}&zoom={}&resx={}&resy={}",
            self.center_x, self.center_y, self.zoom, self.res_x, self.res_y
        )
    }

    /// Full request URL for a viewer page at `page_href`.
    pub fn url_for_page(&self, page_href: &str) -> String {
        format!("{}?{}", fractal_endpoint(page_href), self.to_query())
    }
}

/// Endpoint URL under the current page path: the page URL without its
/// query string or fragment, followed by `fractal`.
pub fn fractal_endpoint(page_href: &str) -> String {
    let base = page_href.split('#').next().unwrap_or_default();
    let base = base.split('?').next().unwrap_or_default();
    format!("{base}{FRACTAL_ENDPOINT}")
}

/// JSON body returned by the fractal endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FractalResponse {
    #[serde(rename = "ResX")]
    pub res_x: u32,
    #[serde(rename = "ResY")]
    pub res_y: u32,
    /// Base64 of the bit-packed pixels, see [`crate::bitmap`].
    #[serde(rename = "Image")]
    pub image: String,
}

impl FractalResponse {
    pub fn from_pixels(res_x: u32, res_y: u32, pixels: &[bool]) -> Self {
        Self {
            res_x,
            res_y,
            image: encode_bitmap(pixels),
        }
    }

    /// Decode the bitmap and cut it down to `ResX * ResY` pixels.
    pub fn decode(&self) -> Result<DecodedImage, FetchError> {
        let mut pixels = decode_bitmap(&self.image)?;
        let expected = self.res_x as usize * self.res_y as usize;
        if pixels.len() < expected {
            return Err(FetchError::Protocol(format!(
                "bitmap holds {} pixels, {}x{} needs {expected}",
                pixels.len(),
                self.res_x,
                self.res_y
            )));
        }
        pixels.truncate(expected);
        Ok(DecodedImage {
            res_x: self.res_x,
            res_y: self.res_y,
            pixels,
        })
    }
}

/// Parse a raw response body and decode its bitmap.
pub fn parse_response(body: &str) -> Result<DecodedImage, FetchError> {
    let response: FractalResponse = serde_json::from_str(body)?;
    response.decode()
}

/// Decoded pixels, row-major, exactly `res_x * res_y` long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub res_x: u32,
    pub res_y: u32,
    pub pixels: Vec<bool>,
}
