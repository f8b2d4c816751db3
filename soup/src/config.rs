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

use displaydoc::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::system::System;

/// Configurations of the recommendation system.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
#[must_use]
pub struct Config {
    attribute_weight: f32,
    similarity_weight: f32,
    top_k: usize,
}

// the f32 fields are never NaN by construction
impl Eq for Config {}

impl Default for Config {
    fn default() -> Self {
        Self {
            attribute_weight: 0.7,
            similarity_weight: 0.3,
            top_k: 5,
        }
    }
}

/// Errors of the recommendation system configuration.
#[derive(Copy, Clone, Debug, Display, Error)]
pub enum InvalidConfig {
    /// Invalid attribute weight, expected value from the unit interval
    AttributeWeight,
    /// Invalid similarity weight, expected value from the unit interval
    SimilarityWeight,
    /// Invalid weight sum, expected positive value of at most one
    WeightSum,
    /// Invalid number of recommendations, expected positive value
    TopK,
}

impl Config {
    pub fn validate(&self) -> Result<(), InvalidConfig> {
        if !(0. ..=1.).contains(&self.attribute_weight) {
            return Err(InvalidConfig::AttributeWeight);
        }
        if !(0. ..=1.).contains(&self.similarity_weight) {
            return Err(InvalidConfig::SimilarityWeight);
        }
        let sum = self.attribute_weight + self.similarity_weight;
        if !(sum > 0. && sum <= 1.) {
            return Err(InvalidConfig::WeightSum);
        }
        if self.top_k == 0 {
            return Err(InvalidConfig::TopK);
        }

        Ok(())
    }

    /// The weight of the attribute match in the combined score.
    pub fn attribute_weight(&self) -> f32 {
        self.attribute_weight
    }

    /// Sets the attribute weight.
    ///
    /// # Errors
    /// Fails if the weight is outside of the unit interval or the weights sum
    /// to zero or beyond one.
    pub fn with_attribute_weight(mut self, attribute_weight: f32) -> Result<Self, InvalidConfig> {
        self.attribute_weight = attribute_weight;
        self.validate()?;

        Ok(self)
    }

    /// The weight of the embedding similarity in the combined score.
    pub fn similarity_weight(&self) -> f32 {
        self.similarity_weight
    }

    /// Sets the similarity weight.
    ///
    /// # Errors
    /// Fails if the weight is outside of the unit interval or the weights sum
    /// to zero or beyond one.
    pub fn with_similarity_weight(mut self, similarity_weight: f32) -> Result<Self, InvalidConfig> {
        self.similarity_weight = similarity_weight;
        self.validate()?;

        Ok(self)
    }

    /// The number of returned recommendations.
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Sets the number of recommendations.
    ///
    /// # Errors
    /// Fails if the number is zero.
    pub fn with_top_k(mut self, top_k: usize) -> Result<Self, InvalidConfig> {
        self.top_k = top_k;
        self.validate()?;

        Ok(self)
    }

    /// Creates a recommendation system.
    pub fn build(self) -> System {
        System { config: self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_validate_weights() {
        assert!(Config::default().with_attribute_weight(-0.1).is_err());
        assert!(Config::default().with_similarity_weight(1.1).is_err());

        let config = Config::default()
            .with_similarity_weight(0.)
            .unwrap()
            .with_attribute_weight(1.)
            .unwrap();
        assert!(config.validate().is_ok());

        assert!(config.with_attribute_weight(0.).is_err());
    }

    #[test]
    fn test_validate_top_k() {
        assert!(Config::default().with_top_k(0).is_err());
        assert!(Config::default().with_top_k(1).is_ok());
    }
}
