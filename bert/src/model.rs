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

use std::{fs::File, io::BufReader};

use anyhow::{bail, Result};
use derive_more::{Deref, From};
use serde::Deserialize;
use tract_onnx::prelude::{
    tvec,
    Framework,
    InferenceFact,
    InferenceModel,
    InferenceModelExt,
    IntoArcTensor,
    TValue,
    TVec,
    TypedModel,
    TypedRunnableModel,
};

use crate::{config::Config, tokenizer::Encoding};

#[derive(Deserialize)]
enum DynDim {
    #[serde(rename = "token size")]
    TokenSize,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Dimension {
    Fixed(usize),
    Dynamic(DynDim),
}

impl Config {
    fn extract_facts(
        &self,
        io: &'static str,
        mut model: InferenceModel,
        with_io_fact: impl Fn(InferenceModel, usize, InferenceFact) -> Result<InferenceModel>,
    ) -> Result<InferenceModel> {
        let mut i = 0;
        while let Ok(datum_type) = self
            .extract::<String>(&format!("model.{io}.{i}.type"))
            .map_err(Into::into)
            .and_then(|datum_type| datum_type.parse())
        {
            let mut shape = Vec::new();
            let mut j = 0;
            while let Ok(dim) = self.extract::<Dimension>(&format!("model.{io}.{i}.shape.{j}")) {
                let dim = match dim {
                    Dimension::Fixed(dim) => dim,
                    Dimension::Dynamic(DynDim::TokenSize) => self.token_size,
                };
                shape.push(dim);
                j += 1;
            }
            model = with_io_fact(model, i, InferenceFact::dt_shape(datum_type, shape))?;
            i += 1;
        }

        Ok(model)
    }

    /// The last fixed dimension of the first model output.
    ///
    /// This is the embedding size for an embedder and the number of classes
    /// for a classifier.
    fn output_size(&self) -> Result<usize> {
        let mut size = None;
        let mut j = 0;
        while let Ok(dim) = self.extract::<Dimension>(&format!("model.output.0.shape.{j}")) {
            if let Dimension::Fixed(dim) = dim {
                size = Some(dim);
            }
            j += 1;
        }

        match size {
            Some(size) => Ok(size),
            None => bail!("model config doesn't declare a fixed output dimension"),
        }
    }
}

/// An onnx model run by tract.
#[derive(Debug)]
pub(crate) struct Model {
    model: TypedRunnableModel<TypedModel>,
    pub(crate) token_size: usize,
    pub(crate) output_size: usize,
}

/// The predicted encoding.
///
/// The prediction is of shape `(1, token_size, embedding_size)` for an
/// embedder and `(1, classes)` for a classifier.
#[derive(Clone, Deref, From)]
pub(crate) struct Prediction(TValue);

impl From<Encoding> for TVec<TValue> {
    fn from(encoding: Encoding) -> Self {
        let mut inputs = tvec![
            TValue::Const(encoding.token_ids.into_arc_tensor()),
            TValue::Const(encoding.attention_mask.into_arc_tensor()),
        ];
        if let Some(type_ids) = encoding.type_ids {
            inputs.push(TValue::Const(type_ids.into_arc_tensor()));
        }

        inputs
    }
}

impl Model {
    /// Creates a model from a configuration.
    pub(crate) fn new(config: &Config) -> Result<Self> {
        let model = config.dir.join("model.onnx");
        if !model.exists() {
            bail!("pipeline model '{}' doesn't exist", model.display());
        }

        let mut reader = BufReader::new(File::open(model)?);
        let model = tract_onnx::onnx().model_for_read(&mut reader)?;
        let model = config.extract_facts("input", model, InferenceModel::with_input_fact)?;
        let model = config.extract_facts("output", model, InferenceModel::with_output_fact)?;
        let model = model.into_optimized()?.into_runnable()?;

        Ok(Model {
            model,
            token_size: config.token_size,
            output_size: config.output_size()?,
        })
    }

    /// Runs prediction on the encoded sequence.
    pub(crate) fn predict(&self, encoding: Encoding) -> Result<Prediction> {
        let inputs = encoding.into();
        let mut outputs = self.model.run(inputs)?;

        Ok(outputs.swap_remove(0).into())
    }
}
