/// RGBA for a `true` pixel.
pub const BLACK: [u8; 4] = [0, 0, 0, 255];
/// RGBA for a `false` pixel.
pub const WHITE: [u8; 4] = [255, 255, 255, 255];

pub fn pixel_color(set: bool) -> [u8; 4] {
    if set { BLACK } else { WHITE }
}

/// Expand pixels into a row-major RGBA buffer suitable for `ImageData`.
pub fn to_rgba(pixels: &[bool]) -> Vec<u8> {
    pixels.iter().flat_map(|&set| pixel_color(set)).collect()
}
