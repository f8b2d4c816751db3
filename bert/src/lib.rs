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

//! Local ONNX pipelines for mood texts.
//!
//! Two pipelines share the same tokenizer and model machinery: an embedder
//! which pools token predictions into a fixed-length f32 vector, and a
//! sentiment classifier which applies a softmax head over the model logits.
//! Both are configured from a per-model directory holding `config.toml`,
//! `tokenizer.json` and `model.onnx`.

#![forbid(unsafe_op_in_unsafe_fn)]
#![deny(
    clippy::future_not_send,
    clippy::pedantic,
    noop_method_call,
    rust_2018_idioms,
    unsafe_code,
    unused_qualifications
)]
#![warn(unreachable_pub, rustdoc::missing_crate_level_docs)]
#![allow(
    clippy::items_after_statements,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate
)]

mod config;
mod embedding;
mod model;
mod pipeline;
mod pooler;
mod sentiment;
mod tokenizer;

pub use crate::{
    config::Config,
    embedding::{Embedding, Embedding1, InvalidEmbedding, NormalizedEmbedding},
    pipeline::{Pipeline, PipelineError},
    sentiment::{Classifier, Sentiment},
};
