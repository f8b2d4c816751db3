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

//! Shared plumbing for the quote recommendation front-ends.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![cfg_attr(test, deny(unsafe_code))]
#![deny(
    clippy::pedantic,
    noop_method_call,
    rust_2018_idioms,
    unused_qualifications,
    unsafe_op_in_unsafe_fn
)]
#![warn(unreachable_pub, rustdoc::missing_crate_level_docs)]
#![allow(
    clippy::items_after_statements,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate
)]

use std::{
    io::{self, Write},
    path::PathBuf,
};

use anyhow::{Context as _, Result};
use clap::Parser;
use soulsoup_ai::{Attributes, Corpus, Label, Rating, Recommendation, System};
use soulsoup_bert::{Pipeline, Sentiment};
use tracing::{error, info, warn};
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
pub struct Args {
    /// The directory holding the quote corpus and its vectors file.
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,
    /// The directory holding the embedder model assets.
    #[arg(long, default_value = "assets/embedder")]
    pub model_dir: PathBuf,
    /// The directory holding the sentiment classifier assets.
    #[arg(long, default_value = "assets/sentiment")]
    pub sentiment_dir: PathBuf,
}

/// The corpus, embedder and recommendation system owned by a front-end.
pub struct Context {
    pub corpus: Corpus,
    pub embedder: Pipeline,
    pub system: System,
}

impl Context {
    const CORPUS_FILE: &str = "chicken_soup.csv";
    const VECTORS_FILE: &str = "chicken_soup.vectors.bin";

    pub fn init(args: &Args) -> Result<Self> {
        let embedder = soulsoup_bert::Config::new(&args.model_dir)
            .context("failed to read the embedder config")?
            .build()
            .context("failed to build the embedder")?;
        info!(
            token_size = embedder.token_size(),
            embedding_size = embedder.embedding_size(),
            "embedder ready",
        );

        let (corpus, source) = Corpus::load(
            args.data_dir.join(Self::CORPUS_FILE),
            args.data_dir.join(Self::VECTORS_FILE),
            &embedder,
        )
        .context("failed to load the corpus")?;
        info!(quotes = corpus.len(), ?source, "corpus ready");

        let system = soulsoup_ai::Config::default().build();

        Ok(Self {
            corpus,
            embedder,
            system,
        })
    }
}

/// Maps a sentiment to the tone of the quotes to recommend.
///
/// The mapping is inverted on purpose: a negative mood gets comforting
/// quotes, a positive mood can take the tough love ones. Unknown labels get
/// the comforting default.
pub fn preference_for(sentiment: &Sentiment) -> Label {
    match sentiment.label.as_str() {
        "NEGATIVE" => Label::Positive,
        "POSITIVE" => Label::Negative,
        label => {
            warn!(label, "unexpected sentiment label, recommending positive quotes");
            Label::Positive
        }
    }
}

/// Reads one trimmed line from stdin after printing the message.
pub fn prompt(message: &str) -> Result<String> {
    print!("{message}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;

    Ok(line.trim().to_owned())
}

/// Prompts for the four attribute ratings.
///
/// An empty input is the neutral rating, anything unparsable falls back to it
/// with a logged warning.
pub fn prompt_attributes() -> Result<Attributes> {
    Ok(Attributes {
        stress: prompt_rating("stress")?,
        happiness: prompt_rating("happiness")?,
        humor: prompt_rating("humor")?,
        encouragement: prompt_rating("encouragement")?,
    })
}

fn prompt_rating(attribute: &'static str) -> Result<Rating> {
    let input = prompt(&format!("Rate your {attribute} (1-5) [3]: "))?;
    if input.is_empty() {
        return Ok(Rating::NEUTRAL);
    }

    let resolved = Rating::resolve(attribute, &input);
    if let Some(fallback) = resolved.fallback {
        warn!(%fallback);
    }

    Ok(resolved.value)
}

/// Prints the ranked list with its score breakdown.
pub fn print_ranked(recommendations: &[Recommendation<'_>]) {
    for (rank, recommendation) in recommendations.iter().enumerate() {
        let scores = &recommendation.scores;
        let entry = recommendation.entry;
        println!("{}. [{:.3}] {}", rank + 1, scores.combined, entry.text);
        match scores.attribute_match {
            Some(attribute_match) => println!(
                "   similarity {:.3}, attribute match {:.3}, {} ({})",
                scores.similarity,
                attribute_match,
                entry.attributes.to_mood_text(),
                entry.label,
            ),
            None => println!("   similarity {:.3} ({})", scores.similarity, entry.label),
        }
    }
}

/// Initializes the logging to stderr.
///
/// The filter is read from `RUST_LOG` and defaults to `info`.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    init_panic_logging();
}

fn init_panic_logging() {
    std::panic::set_hook(Box::new(|panic| {
        if let Some(location) = panic.location() {
            error!(
                message = %panic,
                panic.file = location.file(),
                panic.line = location.line(),
                panic.column = location.column(),
            );
        } else {
            error!(message = %panic);
        }
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentiment(label: &str) -> Sentiment {
        Sentiment {
            label: label.to_owned(),
            confidence: 0.9,
        }
    }

    #[test]
    fn test_preference_is_inverted() {
        assert_eq!(preference_for(&sentiment("NEGATIVE")), Label::Positive);
        assert_eq!(preference_for(&sentiment("POSITIVE")), Label::Negative);
    }

    #[test]
    fn test_unknown_sentiment_prefers_positive() {
        assert_eq!(preference_for(&sentiment("NEUTRAL")), Label::Positive);
        assert_eq!(preference_for(&sentiment("")), Label::Positive);
    }
}
