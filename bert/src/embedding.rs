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

use derive_more::{Deref, From};
use displaydoc::Display;
use ndarray::{Array, Array1, Dimension, Ix, Ix1};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use soulsoup_test_utils::ApproxEqIter;
use thiserror::Error;

/// A d-dimensional sequence embedding.
#[derive(Clone, Debug, Deref, From, Default)]
pub struct Embedding<D>(Array<f32, D>)
where
    D: Dimension;

impl<'a, D> ApproxEqIter<'a, f32> for Embedding<D>
where
    D: 'a + Dimension,
{
    fn indexed_iter_logical_order(
        &'a self,
        index_prefix: Vec<Ix>,
    ) -> Box<dyn 'a + Iterator<Item = (Vec<Ix>, f32)>> {
        (**self).indexed_iter_logical_order(index_prefix)
    }
}

/// A 1-dimensional sequence embedding.
///
/// The embedding is of shape `(embedding_size,)`. The serde is identical to a `Vec<f32>`.
pub type Embedding1 = Embedding<Ix1>;

/// A normalized embedding.
#[derive(Clone, Debug, Deref, Deserialize, Serialize)]
#[serde(transparent)]
pub struct NormalizedEmbedding(Embedding1);

/// Values don't represent a valid embedding.
#[derive(Clone, Debug, Display, Error, Serialize)]
pub struct InvalidEmbedding;

impl Embedding1 {
    pub fn normalize(mut self) -> Result<NormalizedEmbedding, InvalidEmbedding> {
        let norm = self.dot(&*self).sqrt();
        if !norm.is_finite() {
            return Err(InvalidEmbedding);
        }

        if norm > 0. {
            self.0 /= norm;
        } else {
            self.0 = Array1::zeros(self.len());
        };

        Ok(NormalizedEmbedding(self))
    }
}

impl From<Vec<f32>> for Embedding1 {
    fn from(vec: Vec<f32>) -> Self {
        Array1::from_vec(vec).into()
    }
}

impl<const N: usize> From<[f32; N]> for Embedding1 {
    fn from(array: [f32; N]) -> Self {
        Vec::from(array).into()
    }
}

impl Serialize for Embedding1 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(&self.0)
    }
}

impl<'de> Deserialize<'de> for Embedding1 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Vec::<f32>::deserialize(deserializer).map(Self::from)
    }
}

impl NormalizedEmbedding {
    /// The value is bounded in `[-1, 1]`.
    pub fn dot_product(&self, other: &Self) -> f32 {
        self.dot(&other.0 .0).clamp(-1., 1.)
    }
}

impl TryFrom<Vec<f32>> for NormalizedEmbedding {
    type Error = InvalidEmbedding;

    fn try_from(vec: Vec<f32>) -> Result<Self, Self::Error> {
        Embedding1::from(vec).normalize()
    }
}

impl<const N: usize> TryFrom<[f32; N]> for NormalizedEmbedding {
    type Error = InvalidEmbedding;

    fn try_from(array: [f32; N]) -> Result<Self, Self::Error> {
        Embedding1::from(array).normalize()
    }
}

impl<'a> ApproxEqIter<'a, f32> for NormalizedEmbedding {
    fn indexed_iter_logical_order(
        &'a self,
        index_prefix: Vec<Ix>,
    ) -> Box<dyn 'a + Iterator<Item = (Vec<Ix>, f32)>> {
        (**self).indexed_iter_logical_order(index_prefix)
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::SQRT_2;

    use soulsoup_test_utils::assert_approx_eq;

    use super::*;

    #[test]
    fn test_normalize() {
        assert!(Embedding1::from([f32::NAN]).normalize().is_err());
        assert!(Embedding1::from([f32::INFINITY]).normalize().is_err());
        assert!(Embedding1::from([f32::NEG_INFINITY]).normalize().is_err());

        let embedding = Embedding1::from([0., 0., 0.]);
        assert_approx_eq!(f32, embedding.clone().normalize().unwrap(), embedding);

        let embedding = Embedding1::from([0., 1., 2., 3., SQRT_2])
            .normalize()
            .unwrap();
        assert_approx_eq!(f32, embedding, [0., 0.25, 0.5, 0.75, SQRT_2.powi(-3)]);

        let embedding = Embedding1::from([-1., 1., -1., 1.]).normalize().unwrap();
        assert_approx_eq!(f32, embedding, [-0.5, 0.5, -0.5, 0.5]);
    }

    #[test]
    fn test_dot_product_is_clamped() {
        let embedding = NormalizedEmbedding::try_from([1., 0.]).unwrap();
        assert_approx_eq!(f32, embedding.dot_product(&embedding), 1.);

        let opposite = NormalizedEmbedding::try_from([-1., 0.]).unwrap();
        assert_approx_eq!(f32, embedding.dot_product(&opposite), -1.);
    }

    #[test]
    fn test_serde_roundtrip() {
        let embedding = NormalizedEmbedding::try_from([0.6, 0.8]).unwrap();
        let json = serde_json::to_string(&embedding).unwrap();
        assert_eq!(json, "[0.6,0.8]");
        let deserialized = serde_json::from_str::<NormalizedEmbedding>(&json).unwrap();
        assert_approx_eq!(f32, embedding, deserialized);
    }
}
