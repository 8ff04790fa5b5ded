// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Pluggable predicate: does a query image match a stored target image? (§4.1)

use image::{imageops::FilterType, DynamicImage, GenericImageView};

/// `matches(stored_image_bytes, query_image_bytes) -> bool`.
pub trait ImageMatcher: Send + Sync {
    fn matches(&self, stored: &[u8], query: &[u8]) -> bool;
}

/// Bytewise equality.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatcher;

impl ImageMatcher for ExactMatcher {
    fn matches(&self, stored: &[u8], query: &[u8]) -> bool {
        stored == query
    }
}

/// 64-bit perceptual hash (8x8 downscale, greyscale mean threshold);
/// matches iff Hamming distance is within `threshold`. Returns `false` if
/// either image fails to decode.
#[derive(Debug, Clone, Copy)]
pub struct AverageHashMatcher {
    pub threshold: u32,
}

impl AverageHashMatcher {
    pub const fn new(threshold: u32) -> Self {
        Self { threshold }
    }
}

impl Default for AverageHashMatcher {
    fn default() -> Self {
        Self::new(10)
    }
}

impl ImageMatcher for AverageHashMatcher {
    fn matches(&self, stored: &[u8], query: &[u8]) -> bool {
        let (Some(a), Some(b)) = (average_hash(stored), average_hash(query)) else {
            return false;
        };
        (a ^ b).count_ones() <= self.threshold
    }
}

/// Compute the 8x8 average-hash of a decodable image, or `None` if it does
/// not decode.
pub fn average_hash(bytes: &[u8]) -> Option<u64> {
    let img = decode(bytes)?;
    let small = img
        .resize_exact(8, 8, FilterType::Triangle)
        .grayscale();
    let pixels: Vec<u8> = (0..8)
        .flat_map(|y| (0..8).map(move |x| (x, y)))
        .map(|(x, y)| small.get_pixel(x, y).0[0])
        .collect();
    let mean = pixels.iter().map(|&p| p as u32).sum::<u32>() / pixels.len() as u32;
    let mut hash: u64 = 0;
    for (i, &p) in pixels.iter().enumerate() {
        if p as u32 >= mean {
            hash |= 1 << i;
        }
    }
    Some(hash)
}

/// Decode raw bytes as a PNG or JPEG image. Returns `None` for anything
/// else, including truncated/corrupt files.
pub fn decode(bytes: &[u8]) -> Option<DynamicImage> {
    image::load_from_memory(bytes).ok()
}

/// Sniff whether `bytes` look like a PNG or JPEG by magic number, the way
/// the validator chain checks format before attempting a full decode.
pub fn looks_like_png_or_jpeg(bytes: &[u8]) -> bool {
    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];
    const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
    bytes.starts_with(PNG_MAGIC) || bytes.starts_with(JPEG_MAGIC)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = DynamicImage::new_rgb8(w, h);
        let mut buf = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn exact_matcher_requires_identical_bytes() {
        let a = png_bytes(2, 2);
        let mut b = a.clone();
        b.push(0);
        let matcher = ExactMatcher;
        assert!(matcher.matches(&a, &a));
        assert!(!matcher.matches(&a, &b));
    }

    #[test]
    fn average_hash_matches_identical_image() {
        let a = png_bytes(16, 16);
        let matcher = AverageHashMatcher::default();
        assert!(matcher.matches(&a, &a));
    }

    #[test]
    fn average_hash_rejects_undecodable_bytes() {
        let matcher = AverageHashMatcher::default();
        assert!(!matcher.matches(b"not an image", b"also not an image"));
    }

    #[test]
    fn sniff_recognizes_png_magic() {
        assert!(looks_like_png_or_jpeg(&png_bytes(1, 1)));
        assert!(!looks_like_png_or_jpeg(b"plain text"));
    }
}
