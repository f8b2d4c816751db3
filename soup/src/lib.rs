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

//! Mood-based quote recommendation.
//!
//! A [`Corpus`] of labeled, attribute-rated quotes is scored against a mood
//! query. The query is either a free mood text turned into a normalized
//! embedding, or a set of four attribute ratings blended with the embedding
//! similarity. The [`System`] ranks the corpus and returns the top entries.

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

mod attributes;
mod config;
mod corpus;
mod embedder;
mod query;
mod system;
mod utils;

pub use soulsoup_bert::NormalizedEmbedding;

pub use crate::{
    attributes::{Attributes, InvalidRating, Rating},
    config::{Config, InvalidConfig},
    corpus::{Corpus, CorpusError, Entry, InvalidLabel, Label, VectorsSource},
    embedder::{BoxedError, TextEmbedder},
    query::{Fallback, Resolved},
    system::{Recommendation, Scores, System},
};
