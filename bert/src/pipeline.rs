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
use ndarray::Ix3;
use thiserror::Error;

use crate::{model::Model, pooler::AveragePooler, tokenizer::Tokenizer, Embedding1};

/// An embedder pipeline built from a [`Config`].
///
/// Consists of a tokenizer, a model and an average pooler.
///
/// [`Config`]: crate::config::Config
pub struct Pipeline {
    pub(crate) tokenizer: Tokenizer,
    pub(crate) model: Model,
}

/// The potential errors of the [`Pipeline`] and [`Classifier`].
///
/// [`Classifier`]: crate::sentiment::Classifier
#[derive(Debug, Display, Error)]
pub enum PipelineError {
    /// Failed to configure the pipeline: {0}
    Config(#[from] figment::Error),
    /// Failed to run the tokenizer: {0}
    Tokenizer(#[from] tokenizers::Error),
    /// Failed to run the model: {0}
    Model(Box<dyn std::error::Error + Send + Sync>),
}

impl PipelineError {
    pub(crate) fn model(error: anyhow::Error) -> Self {
        Self::Model(error.into())
    }
}

impl Pipeline {
    /// Computes the pooled embedding of the sequence.
    pub fn run(&self, sequence: impl AsRef<str>) -> Result<Embedding1, PipelineError> {
        let encoding = self.tokenizer.encode(sequence)?;
        let attention_mask = encoding.attention_mask.clone();
        let prediction = self.model.predict(encoding).map_err(PipelineError::model)?;
        let prediction = prediction
            .to_array_view::<f32>()
            .map_err(PipelineError::model)?
            .into_dimensionality::<Ix3>()
            .map_err(|error| PipelineError::Model(error.into()))?;

        Ok(AveragePooler::pool(&prediction, &attention_mask))
    }

    /// Gets the token size.
    pub fn token_size(&self) -> usize {
        self.model.token_size
    }

    /// Gets the embedding size.
    pub fn embedding_size(&self) -> usize {
        self.model.output_size
    }
}
