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
use figment::value::Dict;
use ndarray::Array2;
use tokenizers::{
    tokenizer::Tokenizer as HfTokenizer,
    utils::{
        padding::{PaddingDirection, PaddingParams, PaddingStrategy},
        truncation::{TruncationDirection, TruncationParams, TruncationStrategy},
    },
    Error,
};

use crate::config::Config;

/// A pre-configured huggingface tokenizer.
pub(crate) struct Tokenizer {
    tokenizer: HfTokenizer,
    add_special_tokens: bool,
    use_type_ids: bool,
}

/// The encoded sequence, shaped for the model inputs.
///
/// All arrays are of shape `(1, token_size)`. The type ids are only present
/// for models which declare a third input.
pub(crate) struct Encoding {
    pub(crate) token_ids: Array2<i64>,
    pub(crate) attention_mask: Array2<i64>,
    pub(crate) type_ids: Option<Array2<i64>>,
}

impl Tokenizer {
    pub(crate) fn new(config: &Config) -> Result<Self, Error> {
        let tokenizer = config.dir.join("tokenizer.json");
        if !tokenizer.exists() {
            return Err(
                anyhow!("pipeline tokenizer '{}' doesn't exist", tokenizer.display()).into(),
            );
        }
        let mut tokenizer = HfTokenizer::from_file(tokenizer)?;
        let padding_token = config.extract::<String>("tokenizer.tokens.padding")?;
        let padding = PaddingParams {
            strategy: PaddingStrategy::Fixed(config.token_size),
            direction: PaddingDirection::Right,
            pad_to_multiple_of: None,
            pad_id: tokenizer
                .token_to_id(&padding_token)
                .ok_or("missing padding token")?,
            pad_type_id: 0,
            pad_token: padding_token,
        };
        let truncation = TruncationParams {
            direction: TruncationDirection::Right,
            max_length: config.token_size,
            strategy: TruncationStrategy::LongestFirst,
            stride: 0,
        };
        tokenizer.with_padding(Some(padding));
        tokenizer.with_truncation(Some(truncation));
        let add_special_tokens = config.extract::<bool>("tokenizer.add-special-tokens")?;
        let use_type_ids = config.extract::<Dict>("model.input")?.len() > 2;

        Ok(Tokenizer {
            tokenizer,
            add_special_tokens,
            use_type_ids,
        })
    }

    /// Encodes the sequence.
    ///
    /// The encoding is in correct shape for the model.
    pub(crate) fn encode(&self, sequence: impl AsRef<str>) -> Result<Encoding, Error> {
        let tokens = self
            .tokenizer
            .encode(sequence.as_ref(), self.add_special_tokens)?;
        let array_from =
            |slice: &[u32]| Array2::from_shape_fn((1, slice.len()), |(_, i)| i64::from(slice[i]));

        Ok(Encoding {
            token_ids: array_from(tokens.get_ids()),
            attention_mask: array_from(tokens.get_attention_mask()),
            type_ids: self
                .use_type_ids
                .then(|| array_from(tokens.get_type_ids())),
        })
    }
}
