// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

pub mod matcher;
pub mod rater;

pub use matcher::{AverageHashMatcher, ExactMatcher, ImageMatcher};
pub use rater::{PerceptualQualityRater, RandomRater, TargetRater};

/// Closed sum type for config-selected matchers (design note §9).
#[derive(Debug, Clone, Copy)]
pub enum ImageMatcherChoice {
    Exact,
    AverageHash { threshold: u32 },
}

impl ImageMatcherChoice {
    pub fn build(self) -> Box<dyn ImageMatcher> {
        match self {
            ImageMatcherChoice::Exact => Box::new(ExactMatcher),
            ImageMatcherChoice::AverageHash { threshold } => {
                Box::new(AverageHashMatcher::new(threshold))
            }
        }
    }
}

impl std::str::FromStr for ImageMatcherChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exact" => Ok(Self::Exact),
            "average-hash" => Ok(Self::AverageHash { threshold: 10 }),
            other => Err(format!("unknown image matcher: {other}")),
        }
    }
}

/// Closed sum type for config-selected raters (design note §9).
#[derive(Debug, Clone, Copy)]
pub enum TargetRaterChoice {
    Random,
    PerceptualQuality,
}

impl TargetRaterChoice {
    pub fn build(self) -> Box<dyn TargetRater> {
        match self {
            TargetRaterChoice::Random => Box::new(RandomRater),
            TargetRaterChoice::PerceptualQuality => Box::new(PerceptualQualityRater),
        }
    }
}

impl std::str::FromStr for TargetRaterChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random" => Ok(Self::Random),
            "perceptual-quality" => Ok(Self::PerceptualQuality),
            other => Err(format!("unknown target rater: {other}")),
        }
    }
}
