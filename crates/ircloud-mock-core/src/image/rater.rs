// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Pluggable function assigning a tracking-rating integer to a stored image (§4.2).

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::matcher::decode;

/// `rate(image_bytes) -> int in [0, 5]`. Images that fail to decode return 0.
pub trait TargetRater: Send + Sync {
    fn rate(&self, target_id: &str, image_bytes: &[u8]) -> i32;
}

/// Uniform integer 0..=5, seeded per-image by identifier for reproducibility.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomRater;

impl TargetRater for RandomRater {
    fn rate(&self, target_id: &str, image_bytes: &[u8]) -> i32 {
        if decode(image_bytes).is_none() {
            return 0;
        }
        let seed = seed_from_id(target_id);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.gen_range(0..=5)
    }
}

/// No-reference image-quality proxy: variance of a simple gradient over the
/// greyscale image, clamped to 0..=5. Stands in for a full no-reference IQA
/// model (out of scope per spec's "real image recognition" non-goal).
#[derive(Debug, Clone, Copy, Default)]
pub struct PerceptualQualityRater;

impl TargetRater for PerceptualQualityRater {
    fn rate(&self, _target_id: &str, image_bytes: &[u8]) -> i32 {
        let Some(img) = decode(image_bytes) else {
            return 0;
        };
        let grey = img.to_luma8();
        let (w, h) = grey.dimensions();
        if w < 2 || h < 2 {
            return 1;
        }
        let mut gradient_sum: f64 = 0.0;
        let mut count: u64 = 0;
        for y in 0..h - 1 {
            for x in 0..w - 1 {
                let p = grey.get_pixel(x, y).0[0] as f64;
                let right = grey.get_pixel(x + 1, y).0[0] as f64;
                let down = grey.get_pixel(x, y + 1).0[0] as f64;
                gradient_sum += (p - right).abs() + (p - down).abs();
                count += 1;
            }
        }
        let mean_gradient = if count == 0 { 0.0 } else { gradient_sum / count as f64 };
        // Empirically-chosen bucketing: sharper/higher-contrast images score
        // higher. Flat or near-uniform images (our synthetic test fixtures)
        // land at the low end.
        let score = (mean_gradient / 12.0).clamp(0.0, 5.0);
        score.round() as i32
    }
}

fn seed_from_id(id: &str) -> u64 {
    // FNV-1a, good enough as a stable, dependency-free string seed.
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in id.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}
