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

//! The interactive three-mode quote recommender.

use anyhow::Result;
use clap::Parser;
use soulsoup_ai::Label;
use soulsoup_bert::Config;
use tracing::{info, warn};

use soulsoup_cli::{
    init_tracing,
    preference_for,
    print_ranked,
    prompt,
    prompt_attributes,
    Args,
    Context,
};

#[derive(Debug, Eq, PartialEq)]
enum Mode {
    /// A forced preference skips the preference prompt.
    Questionnaire { forced: Option<Label> },
    Automatic,
    Attributes,
}

fn resolve_mode(input: &str) -> Mode {
    match input {
        "1" | "" => Mode::Questionnaire { forced: None },
        "2" => Mode::Automatic,
        "3" => Mode::Attributes,
        _ => {
            warn!(input, "unrecognized mode, using the questionnaire with positive quotes");
            Mode::Questionnaire {
                forced: Some(Label::Positive),
            }
        }
    }
}

fn resolve_preference(input: &str) -> Label {
    if input.is_empty() {
        return Label::Positive;
    }

    let resolved = Label::resolve(input);
    if let Some(fallback) = resolved.fallback {
        warn!(%fallback);
    }

    resolved.value
}

fn classify(args: &Args, mood: &str) -> Label {
    let sentiment = Config::new(&args.sentiment_dir)
        .map_err(anyhow::Error::from)
        .and_then(|config| config.build_classifier().map_err(Into::into))
        .and_then(|classifier| classifier.run(mood).map_err(Into::into));

    match sentiment {
        Ok(sentiment) => {
            info!(
                label = %sentiment.label,
                confidence = sentiment.confidence,
                "classified the mood",
            );
            preference_for(&sentiment)
        }
        Err(error) => {
            warn!(%error, "sentiment classification failed, recommending positive quotes");
            Label::Positive
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let context = Context::init(&args)?;

    let mode = resolve_mode(&prompt(
        "Choose a mode: 1 questionnaire, 2 automatic, 3 attributes [1]: ",
    )?);

    let recommendations = match mode {
        Mode::Questionnaire { forced } => {
            let mood = prompt("How do you feel today? ")?;
            let preference = match forced {
                Some(preference) => preference,
                None => resolve_preference(&prompt(
                    "Do you prefer positive or negative quotes? [positive]: ",
                )?),
            };
            let query = context.embedder.run(&mood)?.normalize()?;

            context
                .system
                .recommend_by_similarity(&context.corpus, &query, Some(preference))
        }
        Mode::Automatic => {
            let mood = prompt("How do you feel today? ")?;
            let preference = classify(&args, &mood);
            let query = context.embedder.run(&mood)?.normalize()?;

            context
                .system
                .recommend_by_similarity(&context.corpus, &query, Some(preference))
        }
        Mode::Attributes => {
            let mood = prompt("How do you feel today? (leave empty to use the ratings) ")?;
            let attributes = prompt_attributes()?;
            let mood = if mood.is_empty() {
                attributes.to_mood_text()
            } else {
                mood
            };
            let query = context.embedder.run(&mood)?.normalize()?;

            context
                .system
                .recommend_by_attributes(&context.corpus, &attributes, &query)
        }
    };

    println!();
    print_ranked(&recommendations);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_mode() {
        assert_eq!(resolve_mode("1"), Mode::Questionnaire { forced: None });
        assert_eq!(resolve_mode(""), Mode::Questionnaire { forced: None });
        assert_eq!(resolve_mode("2"), Mode::Automatic);
        assert_eq!(resolve_mode("3"), Mode::Attributes);
    }

    #[test]
    fn test_unrecognized_mode_forces_positive_quotes() {
        for input in ["0", "4", "questionnaire", "maybe"] {
            assert_eq!(
                resolve_mode(input),
                Mode::Questionnaire {
                    forced: Some(Label::Positive),
                },
            );
        }
    }
}
