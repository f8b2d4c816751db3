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

use std::path::PathBuf;

use figment::{
    error::{Actual, Error, Kind},
    providers::{Format, Toml},
    Figment,
};
use serde::Deserialize;

use crate::{
    model::Model,
    pipeline::{Pipeline, PipelineError},
    sentiment::Classifier,
    tokenizer::Tokenizer,
};

/// A pipeline configuration.
///
/// # Example
///
/// The configuration for an embedder pipeline:
///
/// ```toml
/// # the config file is always named `config.toml`
///
/// # the tokenizer is always read from `tokenizer.json`
/// [tokenizer]
/// add-special-tokens = true
///
/// [tokenizer.tokens]
/// # the `token size` must be in the inclusive range, but is passed as an argument
/// size.min = 2
/// size.max = 512
/// padding = "[PAD]"
///
/// # the [model] path is always `model.onnx`
///
/// # each input and output is required by tract
/// # string shapes are considered dynamic and depend on arguments
/// [model.input.0]
/// shape.0 = 1
/// shape.1 = "token size"
/// type = "i64"
///
/// [model.input.1]
/// shape.0 = 1
/// shape.1 = "token size"
/// type = "i64"
///
/// [model.output.0]
/// shape.0 = 1
/// shape.1 = "token size"
/// shape.2 = 384
/// type = "f32"
/// ```
///
/// A classifier configuration additionally names its label set:
///
/// ```toml
/// [classifier]
/// labels = ["NEGATIVE", "POSITIVE"]
/// ```
#[must_use]
pub struct Config {
    pub(crate) dir: PathBuf,
    toml: Figment,
    pub(crate) token_size: usize,
}

impl Config {
    const MIN_TOKEN_SIZE: &str = "tokenizer.tokens.size.min";
    const MAX_TOKEN_SIZE: &str = "tokenizer.tokens.size.max";

    /// Creates a pipeline configuration from a model directory.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, Error> {
        let dir = dir.into();
        let toml = Figment::from(Toml::file(dir.join("config.toml")));
        let token_size = (toml.extract_inner::<usize>(Self::MIN_TOKEN_SIZE)?
            + toml.extract_inner::<usize>(Self::MAX_TOKEN_SIZE)?)
            / 2;

        Ok(Self {
            dir,
            toml,
            token_size,
        })
    }

    pub(crate) fn extract<'b, V>(&self, key: &str) -> Result<V, Error>
    where
        V: Deserialize<'b>,
    {
        self.toml.extract_inner(key)
    }

    /// Sets the token size for the tokenizer and the model.
    ///
    /// Defaults to the midpoint of the token size range.
    ///
    /// # Errors
    /// Fails if `size` is not within the token size range.
    pub fn with_token_size(mut self, size: usize) -> Result<Self, Error> {
        let min = self.extract::<usize>(Self::MIN_TOKEN_SIZE)?;
        let max = self.extract::<usize>(Self::MAX_TOKEN_SIZE)?;

        if (min..=max).contains(&size) {
            self.token_size = size;
            Ok(self)
        } else {
            Err(Error::from(Kind::InvalidValue(
                Actual::Unsigned(size as u128),
                format!("{min}..={max}"),
            )))
        }
    }

    /// Creates an embedder pipeline from this configuration.
    pub fn build(&self) -> Result<Pipeline, PipelineError> {
        let tokenizer = Tokenizer::new(self)?;
        let model = Model::new(self).map_err(PipelineError::model)?;

        Ok(Pipeline { tokenizer, model })
    }

    /// Creates a sentiment classifier from this configuration.
    pub fn build_classifier(&self) -> Result<Classifier, PipelineError> {
        Classifier::new(self)
    }
}
