// Copyright 2025 The Soulsoup Authors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, version 3.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use derive_more::{Display, Into};
use displaydoc::Display as DisplayDoc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::query::{Fallback, Resolved};

/// A mood attribute rating in the inclusive range `1..=5`.
#[derive(
    Clone, Copy, Debug, Display, Eq, Into, Ord, PartialEq, PartialOrd, Serialize, Deserialize,
)]
#[serde(into = "u8", try_from = "u8")]
pub struct Rating(u8);

/// The rating {0} is outside of the inclusive range 1..=5.
#[derive(Clone, Copy, Debug, DisplayDoc, Error)]
pub struct InvalidRating(pub u8);

impl Rating {
    /// The midpoint of the rating range.
    pub const NEUTRAL: Rating = Rating(3);

    /// Resolves a rating from user input.
    ///
    /// Anything which doesn't parse as a rating resolves to [`NEUTRAL`] with
    /// a recorded fallback.
    ///
    /// [`NEUTRAL`]: Rating::NEUTRAL
    pub fn resolve(attribute: &'static str, input: &str) -> Resolved<Rating> {
        input
            .trim()
            .parse::<u8>()
            .ok()
            .and_then(|value| Rating::try_from(value).ok())
            .map_or_else(
                || {
                    Resolved::fallback(
                        Self::NEUTRAL,
                        Fallback::Rating {
                            attribute,
                            input: input.to_owned(),
                        },
                    )
                },
                Resolved::exact,
            )
    }
}

impl TryFrom<u8> for Rating {
    type Error = InvalidRating;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (1..=5).contains(&value) {
            Ok(Rating(value))
        } else {
            Err(InvalidRating(value))
        }
    }
}

/// The four mood attributes rated by a corpus entry or a query.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    pub stress: Rating,
    pub happiness: Rating,
    pub humor: Rating,
    pub encouragement: Rating,
}

impl Attributes {
    /// The largest possible attribute distance, `4 * (5 - 1)`.
    pub const MAX_DISTANCE: u8 = 16;

    /// All attributes at the neutral rating.
    #[must_use]
    pub fn neutral() -> Self {
        Self {
            stress: Rating::NEUTRAL,
            happiness: Rating::NEUTRAL,
            humor: Rating::NEUTRAL,
            encouragement: Rating::NEUTRAL,
        }
    }

    /// The manhattan distance between two attribute sets.
    ///
    /// Bounded by [`MAX_DISTANCE`] and zero exactly for equal attributes.
    ///
    /// [`MAX_DISTANCE`]: Attributes::MAX_DISTANCE
    pub fn distance(&self, other: &Self) -> u8 {
        u8::from(self.stress).abs_diff(other.stress.into())
            + u8::from(self.happiness).abs_diff(other.happiness.into())
            + u8::from(self.humor).abs_diff(other.humor.into())
            + u8::from(self.encouragement).abs_diff(other.encouragement.into())
    }

    /// The distance mapped to a match score in `[0, 1]`.
    ///
    /// Equal attributes score `1`, maximally distant attributes score `0`.
    pub fn normalized_match(&self, other: &Self) -> f32 {
        1. - f32::from(self.distance(other)) / f32::from(Self::MAX_DISTANCE)
    }

    /// Renders the attributes as a mood text for the embedder.
    #[must_use]
    pub fn to_mood_text(&self) -> String {
        format!(
            "stress:{}, happiness:{}, humor:{}, encouragement:{}",
            self.stress, self.happiness, self.humor, self.encouragement,
        )
    }
}

#[cfg(test)]
mod tests {
    use soulsoup_test_utils::assert_approx_eq;

    use super::*;

    fn attributes(ratings: [u8; 4]) -> Attributes {
        Attributes {
            stress: ratings[0].try_into().unwrap(),
            happiness: ratings[1].try_into().unwrap(),
            humor: ratings[2].try_into().unwrap(),
            encouragement: ratings[3].try_into().unwrap(),
        }
    }

    #[test]
    fn test_rating_range() {
        assert!(Rating::try_from(0).is_err());
        assert!(Rating::try_from(1).is_ok());
        assert!(Rating::try_from(5).is_ok());
        assert!(Rating::try_from(6).is_err());
    }

    #[test]
    fn test_resolve_invalid_rating_is_neutral() {
        for input in ["0", "6", "42", "high", "", " "] {
            let resolved = Rating::resolve("stress", input);
            assert_eq!(resolved.value, Rating::NEUTRAL);
            assert_eq!(
                resolved.fallback,
                Some(Fallback::Rating {
                    attribute: "stress",
                    input: input.to_owned(),
                }),
            );
        }

        let resolved = Rating::resolve("stress", " 4 ");
        assert_eq!(resolved.value, Rating::try_from(4).unwrap());
        assert!(resolved.fallback.is_none());
    }

    #[test]
    fn test_distance_bounds() {
        let min = attributes([1, 1, 1, 1]);
        let max = attributes([5, 5, 5, 5]);

        assert_eq!(min.distance(&max), Attributes::MAX_DISTANCE);
        assert_eq!(min.distance(&min), 0);
        assert_eq!(max.distance(&max), 0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = attributes([1, 4, 2, 5]);
        let b = attributes([3, 3, 3, 3]);

        assert_eq!(a.distance(&b), b.distance(&a));
        assert_eq!(a.distance(&b), 2 + 1 + 1 + 2);
    }

    #[test]
    fn test_distance_is_zero_iff_equal() {
        let a = attributes([2, 3, 4, 5]);
        let b = attributes([2, 3, 4, 4]);

        assert_eq!(a.distance(&a), 0);
        assert_ne!(a.distance(&b), 0);
    }

    #[test]
    fn test_normalized_match() {
        let min = attributes([1, 1, 1, 1]);
        let max = attributes([5, 5, 5, 5]);
        let neutral = Attributes::neutral();

        assert_approx_eq!(f32, min.normalized_match(&max), 0.);
        assert_approx_eq!(f32, neutral.normalized_match(&neutral), 1.);
        assert_approx_eq!(f32, min.normalized_match(&neutral), 0.5);
    }

    #[test]
    fn test_mood_text() {
        assert_eq!(
            attributes([1, 2, 3, 4]).to_mood_text(),
            "stress:1, happiness:2, humor:3, encouragement:4",
        );
    }

    #[test]
    fn test_rating_serde() {
        assert_eq!(serde_json::to_string(&Rating::NEUTRAL).unwrap(), "3");
        assert!(serde_json::from_str::<Rating>("5").is_ok());
        assert!(serde_json::from_str::<Rating>("0").is_err());
        assert!(serde_json::from_str::<Rating>("6").is_err());
    }
}
