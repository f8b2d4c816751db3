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

use anyhow::anyhow;
use ndarray::{Array1, ArrayView1, Axis, Ix2};

use crate::{
    config::Config,
    model::Model,
    pipeline::PipelineError,
    tokenizer::Tokenizer,
};

/// A sentiment classifier built from a [`Config`].
///
/// Consists of a tokenizer and a sequence classification model whose raw
/// scores are turned into label probabilities.
pub struct Classifier {
    tokenizer: Tokenizer,
    model: Model,
    labels: Vec<String>,
}

/// The predicted sentiment of a sequence.
#[derive(Clone, Debug)]
pub struct Sentiment {
    /// The most probable label, as named in the configuration.
    pub label: String,
    /// The probability of the label, in the interval `[0, 1]`.
    pub confidence: f32,
}

/// Numerically stable softmax over the raw class scores.
fn softmax(scores: ArrayView1<'_, f32>) -> Array1<f32> {
    let max = scores.fold(f32::NEG_INFINITY, |max, score| max.max(*score));
    let exponentials = scores.mapv(|score| (score - max).exp());
    let sum = exponentials.sum();

    exponentials / sum
}

impl Classifier {
    pub(crate) fn new(config: &Config) -> Result<Self, PipelineError> {
        let tokenizer = Tokenizer::new(config)?;
        let model = Model::new(config).map_err(PipelineError::model)?;
        let labels = config.extract::<Vec<String>>("classifier.labels")?;
        if labels.len() != model.output_size {
            return Err(PipelineError::model(anyhow!(
                "classifier declares {} labels, but the model has {} classes",
                labels.len(),
                model.output_size,
            )));
        }

        Ok(Classifier {
            tokenizer,
            model,
            labels,
        })
    }

    /// Predicts the sentiment of the sequence.
    pub fn run(&self, sequence: impl AsRef<str>) -> Result<Sentiment, PipelineError> {
        let encoding = self.tokenizer.encode(sequence)?;
        let prediction = self.model.predict(encoding).map_err(PipelineError::model)?;
        let prediction = prediction
            .to_array_view::<f32>()
            .map_err(PipelineError::model)?
            .into_dimensionality::<Ix2>()
            .map_err(|error| PipelineError::Model(error.into()))?;
        let probabilities = softmax(prediction.index_axis(Axis(0), 0));

        let (index, confidence) = probabilities
            .iter()
            .copied()
            .enumerate()
            .reduce(|max, class| if class.1 > max.1 { class } else { max })
            .ok_or_else(|| PipelineError::model(anyhow!("model predicted no classes")))?;

        Ok(Sentiment {
            label: self.labels[index].clone(),
            confidence,
        })
    }
}

#[cfg(test)]
mod tests {
    use ndarray::arr1;
    use soulsoup_test_utils::assert_approx_eq;

    use super::*;

    #[test]
    fn test_softmax_uniform() {
        let scores = arr1(&[1., 1., 1., 1.]);
        assert_approx_eq!(f32, softmax(scores.view()), [0.25, 0.25, 0.25, 0.25]);
    }

    #[test]
    fn test_softmax_shift_invariant() {
        let scores = arr1(&[1., 2., 3.]);
        let shifted = arr1(&[1001., 1002., 1003.]);
        assert_approx_eq!(
            f32,
            softmax(scores.view()),
            softmax(shifted.view()),
            epsilon = 1e-6,
        );
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let scores = arr1(&[-2.5, 0.3, 4.2, 1.1]);
        assert_approx_eq!(f32, softmax(scores.view()).sum(), 1.);
    }
}
