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

use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
    str::FromStr,
};

use displaydoc::Display as DisplayDoc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    attributes::{Attributes, InvalidRating, Rating},
    embedder::{BoxedError, TextEmbedder},
    query::{Fallback, Resolved},
    NormalizedEmbedding,
};

/// The tone of a quote.
#[derive(Clone, Copy, Debug, derive_more::Display, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    /// Uplifting, comforting quotes.
    #[display(fmt = "positive")]
    Positive,
    /// Harsh, tough love quotes.
    #[display(fmt = "negative")]
    Negative,
}

/// The label {0:?} is neither "positive" nor "negative".
#[derive(Clone, Debug, DisplayDoc, Error)]
pub struct InvalidLabel(String);

impl FromStr for Label {
    type Err = InvalidLabel;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_lowercase().as_str() {
            "positive" => Ok(Label::Positive),
            "negative" => Ok(Label::Negative),
            _ => Err(InvalidLabel(input.to_owned())),
        }
    }
}

impl Label {
    /// Resolves a tone preference from user input.
    ///
    /// Anything which isn't a label resolves to [`Positive`] with a recorded
    /// fallback.
    ///
    /// [`Positive`]: Label::Positive
    pub fn resolve(input: &str) -> Resolved<Label> {
        input.parse().map_or_else(
            |_| {
                Resolved::fallback(
                    Label::Positive,
                    Fallback::Preference {
                        input: input.to_owned(),
                    },
                )
            },
            Resolved::exact,
        )
    }
}

/// A quote with its tone, attribute ratings and embedding.
#[derive(Clone, Debug)]
pub struct Entry {
    pub text: String,
    pub label: Label,
    pub attributes: Attributes,
    pub embedding: NormalizedEmbedding,
}

/// The quote corpus, fully embedded.
#[derive(Debug)]
pub struct Corpus {
    entries: Vec<Entry>,
}

/// Where the corpus embeddings came from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VectorsSource {
    /// Loaded from the vectors file.
    Precomputed,
    /// Embedded at load time and persisted to the vectors file.
    Recomputed,
}

/// The potential errors of the corpus loader.
#[derive(Debug, DisplayDoc, Error)]
pub enum CorpusError {
    /// Failed to read the corpus: {0}
    Read(#[from] csv::Error),
    /// Corpus row {row} has an invalid rating: {source}
    Record { row: usize, source: InvalidRating },
    /// The corpus doesn't contain any quotes
    Empty,
    /// Failed to embed the quote at row {row}: {source}
    Embed { row: usize, source: BoxedError },
}

#[derive(Debug, Deserialize)]
struct Record {
    text: String,
    label: Label,
    stress_level: u8,
    happiness_level: u8,
    humor_level: u8,
    encouragement_level: u8,
}

impl Record {
    fn attributes(&self, row: usize) -> Result<Attributes, CorpusError> {
        let rating = |level: u8| {
            Rating::try_from(level).map_err(|source| CorpusError::Record { row, source })
        };

        Ok(Attributes {
            stress: rating(self.stress_level)?,
            happiness: rating(self.happiness_level)?,
            humor: rating(self.humor_level)?,
            encouragement: rating(self.encouragement_level)?,
        })
    }
}

impl Corpus {
    /// Loads the corpus from a csv file and its vectors file.
    ///
    /// The vectors file is reused if it holds one embedding per corpus row.
    /// Otherwise all quotes are embedded and the vectors file is rewritten. A
    /// failure to persist the rewritten vectors is only logged, the loaded
    /// corpus stays usable.
    pub fn load(
        corpus: impl AsRef<Path>,
        vectors: impl AsRef<Path>,
        embedder: &impl TextEmbedder,
    ) -> Result<(Self, VectorsSource), CorpusError> {
        let mut records = Vec::new();
        for record in csv::Reader::from_path(corpus.as_ref())?.into_deserialize() {
            records.push(record?);
        }
        let records = records
            .iter()
            .enumerate()
            .map(|(row, record): (_, &Record)| {
                record
                    .attributes(row)
                    .map(|attributes| (record, attributes))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if records.is_empty() {
            return Err(CorpusError::Empty);
        }

        let (embeddings, source) = match Self::read_vectors(vectors.as_ref(), records.len()) {
            Some(embeddings) => (embeddings, VectorsSource::Precomputed),
            None => {
                info!(quotes = records.len(), "embedding the corpus");
                let embeddings = records
                    .iter()
                    .enumerate()
                    .map(|(row, (record, _))| {
                        embedder
                            .embed(&record.text)
                            .map_err(|source| CorpusError::Embed { row, source })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Self::write_vectors(vectors.as_ref(), &embeddings);
                (embeddings, VectorsSource::Recomputed)
            }
        };

        let entries = records
            .into_iter()
            .zip(embeddings)
            .map(|((record, attributes), embedding)| Entry {
                text: record.text.clone(),
                label: record.label,
                attributes,
                embedding,
            })
            .collect();

        Ok((Self { entries }, source))
    }

    fn read_vectors(path: &Path, len: usize) -> Option<Vec<NormalizedEmbedding>> {
        if !path.exists() {
            return None;
        }
        let file = match File::open(path) {
            Ok(file) => file,
            Err(error) => {
                warn!(%error, path = %path.display(), "failed to open the corpus vectors");
                return None;
            }
        };

        match bincode::deserialize_from::<_, Vec<NormalizedEmbedding>>(BufReader::new(file)) {
            Ok(embeddings) if embeddings.len() == len => Some(embeddings),
            Ok(embeddings) => {
                warn!(
                    stored = embeddings.len(),
                    quotes = len,
                    "stored vectors don't match the corpus",
                );
                None
            }
            Err(error) => {
                warn!(%error, path = %path.display(), "failed to decode the corpus vectors");
                None
            }
        }
    }

    fn write_vectors(path: &Path, embeddings: &[NormalizedEmbedding]) {
        let written = File::create(path)
            .map_err(BoxedError::from)
            .and_then(|file| {
                bincode::serialize_into(BufWriter::new(file), embeddings).map_err(Into::into)
            });
        if let Err(error) = written {
            warn!(%error, path = %path.display(), "failed to persist the corpus vectors");
        }
    }

    #[cfg(test)]
    pub(crate) fn from_entries(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use soulsoup_test_utils::assert_approx_eq;

    use super::*;

    struct LengthEmbedder;

    impl TextEmbedder for LengthEmbedder {
        #[allow(clippy::cast_precision_loss)]
        fn embed(&self, text: &str) -> Result<NormalizedEmbedding, BoxedError> {
            Ok(NormalizedEmbedding::try_from(vec![1., text.len() as f32])?)
        }
    }

    const CORPUS: &str = "\
        text,label,stress_level,happiness_level,humor_level,encouragement_level\n\
        Keep going.,positive,4,2,1,5\n\
        Nobody cares. Work harder.,negative,5,1,2,1\n";

    fn write_corpus(dir: &Path, content: &str) -> std::path::PathBuf {
        let path = dir.join("corpus.csv");
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_label_resolve() {
        for input in ["positive", "POSITIVE", " Positive "] {
            let resolved = Label::resolve(input);
            assert_eq!(resolved.value, Label::Positive);
            assert!(resolved.fallback.is_none());
        }

        let resolved = Label::resolve("negative");
        assert_eq!(resolved.value, Label::Negative);
        assert!(resolved.fallback.is_none());

        for input in ["", "pos", "neutral", "42"] {
            let resolved = Label::resolve(input);
            assert_eq!(resolved.value, Label::Positive);
            assert_eq!(
                resolved.fallback,
                Some(Fallback::Preference {
                    input: input.to_owned(),
                }),
            );
        }
    }

    #[test]
    fn test_load_recomputes_then_reuses() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = write_corpus(dir.path(), CORPUS);
        let vectors = dir.path().join("corpus.vectors.bin");

        let (loaded, source) = Corpus::load(&corpus, &vectors, &LengthEmbedder).unwrap();
        assert_eq!(source, VectorsSource::Recomputed);
        assert_eq!(loaded.len(), 2);
        assert!(vectors.exists());

        let (reloaded, source) = Corpus::load(&corpus, &vectors, &LengthEmbedder).unwrap();
        assert_eq!(source, VectorsSource::Precomputed);
        assert_eq!(reloaded.len(), 2);
        for (entry, reloaded) in loaded.entries().iter().zip(reloaded.entries()) {
            assert_approx_eq!(f32, entry.embedding, reloaded.embedding);
        }

        let entry = &loaded.entries()[0];
        assert_eq!(entry.text, "Keep going.");
        assert_eq!(entry.label, Label::Positive);
        assert_eq!(entry.attributes.stress, Rating::try_from(4).unwrap());
        assert_eq!(entry.attributes.encouragement, Rating::try_from(5).unwrap());
    }

    #[test]
    fn test_load_recomputes_on_stale_vectors() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = write_corpus(dir.path(), CORPUS);
        let vectors = dir.path().join("corpus.vectors.bin");

        let stale = vec![NormalizedEmbedding::try_from(vec![1., 0.]).unwrap()];
        bincode::serialize_into(BufWriter::new(File::create(&vectors).unwrap()), &stale).unwrap();

        let (_, source) = Corpus::load(&corpus, &vectors, &LengthEmbedder).unwrap();
        assert_eq!(source, VectorsSource::Recomputed);
    }

    #[test]
    fn test_load_rejects_invalid_rating() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = write_corpus(
            dir.path(),
            "text,label,stress_level,happiness_level,humor_level,encouragement_level\n\
             Breathe.,positive,9,2,1,5\n",
        );
        let vectors = dir.path().join("corpus.vectors.bin");

        let error = Corpus::load(&corpus, &vectors, &LengthEmbedder).unwrap_err();
        assert!(matches!(error, CorpusError::Record { row: 0, .. }));
    }

    #[test]
    fn test_load_rejects_empty_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = write_corpus(
            dir.path(),
            "text,label,stress_level,happiness_level,humor_level,encouragement_level\n",
        );
        let vectors = dir.path().join("corpus.vectors.bin");

        let error = Corpus::load(&corpus, &vectors, &LengthEmbedder).unwrap_err();
        assert!(matches!(error, CorpusError::Empty));
    }
}
