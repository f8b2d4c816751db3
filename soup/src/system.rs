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

use tracing::warn;

use crate::{
    attributes::Attributes,
    config::Config,
    corpus::{Corpus, Entry, Label},
    utils::nan_safe_f32_cmp_desc,
    NormalizedEmbedding,
};

/// The recommendation system.
pub struct System {
    pub(crate) config: Config,
}

/// The score breakdown of a recommendation.
#[derive(Clone, Copy, Debug)]
pub struct Scores {
    /// The ranking score.
    pub combined: f32,
    /// The cosine similarity between the query and the entry embedding.
    pub similarity: f32,
    /// The normalized attribute match, only for attribute-blended queries.
    pub attribute_match: Option<f32>,
}

/// A ranked corpus entry.
#[derive(Clone, Copy, Debug)]
pub struct Recommendation<'a> {
    pub entry: &'a Entry,
    pub scores: Scores,
}

impl System {
    /// The configuration of the system.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Ranks the corpus by embedding similarity to the query.
    ///
    /// An optional tone preference pre-filters the corpus. Entries whose
    /// stored embedding doesn't match the query dimensionality are skipped
    /// with a warning.
    pub fn recommend_by_similarity<'a>(
        &self,
        corpus: &'a Corpus,
        query: &NormalizedEmbedding,
        preference: Option<Label>,
    ) -> Vec<Recommendation<'a>> {
        let recommendations = corpus
            .entries()
            .iter()
            .filter(|entry| preference.map_or(true, |label| entry.label == label))
            .filter_map(|entry| {
                similarity(entry, query).map(|similarity| Recommendation {
                    entry,
                    scores: Scores {
                        combined: similarity,
                        similarity,
                        attribute_match: None,
                    },
                })
            })
            .collect();

        self.rank(recommendations)
    }

    /// Ranks the corpus by blending attribute match and embedding similarity.
    ///
    /// The combined score weighs the normalized attribute match against the
    /// similarity of the query embedding, as configured.
    pub fn recommend_by_attributes<'a>(
        &self,
        corpus: &'a Corpus,
        attributes: &Attributes,
        query: &NormalizedEmbedding,
    ) -> Vec<Recommendation<'a>> {
        let recommendations = corpus
            .entries()
            .iter()
            .filter_map(|entry| {
                similarity(entry, query).map(|similarity| {
                    let attribute_match = attributes.normalized_match(&entry.attributes);
                    let combined = self.config.attribute_weight() * attribute_match
                        + self.config.similarity_weight() * similarity;

                    Recommendation {
                        entry,
                        scores: Scores {
                            combined,
                            similarity,
                            attribute_match: Some(attribute_match),
                        },
                    }
                })
            })
            .collect();

        self.rank(recommendations)
    }

    // the sort is stable, tied entries keep their corpus order
    fn rank<'a>(&self, mut recommendations: Vec<Recommendation<'a>>) -> Vec<Recommendation<'a>> {
        recommendations
            .sort_by(|this, other| nan_safe_f32_cmp_desc(&this.scores.combined, &other.scores.combined));
        recommendations.truncate(self.config.top_k());

        recommendations
    }
}

fn similarity(entry: &Entry, query: &NormalizedEmbedding) -> Option<f32> {
    if entry.embedding.len() == query.len() {
        Some(query.dot_product(&entry.embedding))
    } else {
        warn!(
            entry = entry.embedding.len(),
            query = query.len(),
            "skipping an entry with a mismatched embedding",
        );
        None
    }
}

#[cfg(test)]
mod tests {
    use soulsoup_test_utils::assert_approx_eq;

    use super::*;

    fn attributes(ratings: [u8; 4]) -> Attributes {
        Attributes {
            stress: ratings[0].try_into().unwrap(),
            happiness: ratings[1].try_into().unwrap(),
            humor: ratings[2].try_into().unwrap(),
            encouragement: ratings[3].try_into().unwrap(),
        }
    }

    fn entry(
        text: &str,
        label: Label,
        ratings: [u8; 4],
        embedding: Vec<f32>,
    ) -> Entry {
        Entry {
            text: text.to_owned(),
            label,
            attributes: attributes(ratings),
            embedding: NormalizedEmbedding::try_from(embedding).unwrap(),
        }
    }

    fn corpus() -> Corpus {
        Corpus::from_entries(vec![
            entry("calm", Label::Positive, [1, 1, 1, 1], vec![1., 0., 0.]),
            entry("tough", Label::Negative, [5, 5, 5, 5], vec![0., 1., 0.]),
            entry("balanced", Label::Positive, [3, 3, 3, 3], vec![0., 0., 1.]),
        ])
    }

    fn system() -> System {
        Config::default().build()
    }

    #[test]
    fn test_similarity_ranks_descending() {
        let corpus = corpus();
        let query = NormalizedEmbedding::try_from(vec![0.8, 0.6, 0.]).unwrap();

        let recommendations = system().recommend_by_similarity(&corpus, &query, None);

        assert_eq!(recommendations.len(), 3);
        assert_eq!(recommendations[0].entry.text, "calm");
        assert_eq!(recommendations[1].entry.text, "tough");
        assert_eq!(recommendations[2].entry.text, "balanced");
        for pair in recommendations.windows(2) {
            assert!(pair[0].scores.combined >= pair[1].scores.combined);
        }
        assert_approx_eq!(f32, recommendations[0].scores.similarity, 0.8);
        assert!(recommendations[0].scores.attribute_match.is_none());
    }

    #[test]
    fn test_similarity_respects_preference() {
        let corpus = corpus();
        let query = NormalizedEmbedding::try_from(vec![0.8, 0.6, 0.]).unwrap();

        let recommendations =
            system().recommend_by_similarity(&corpus, &query, Some(Label::Negative));

        assert_eq!(recommendations.len(), 1);
        assert_eq!(recommendations[0].entry.text, "tough");
    }

    #[test]
    fn test_top_k_truncates() {
        let corpus = corpus();
        let query = NormalizedEmbedding::try_from(vec![1., 0., 0.]).unwrap();
        let system = Config::default().with_top_k(2).unwrap().build();

        let recommendations = system.recommend_by_similarity(&corpus, &query, None);
        assert_eq!(recommendations.len(), 2);
    }

    #[test]
    fn test_attributes_rank_neutral_query() {
        let corpus = corpus();
        // the query embedding is equidistant to all entries
        let query = NormalizedEmbedding::try_from(vec![1., 1., 1.]).unwrap();
        let system = Config::default()
            .with_similarity_weight(0.)
            .unwrap()
            .with_attribute_weight(1.)
            .unwrap()
            .build();

        let recommendations =
            system.recommend_by_attributes(&corpus, &Attributes::neutral(), &query);

        // distance 0 ranks first, the two entries at distance 8 tie in corpus order
        assert_eq!(recommendations[0].entry.text, "balanced");
        assert_approx_eq!(f32, recommendations[0].scores.combined, 1.);
        assert_eq!(recommendations[1].entry.text, "calm");
        assert_eq!(recommendations[2].entry.text, "tough");
        assert_approx_eq!(f32, recommendations[1].scores.combined, 0.5);
        assert_approx_eq!(f32, recommendations[2].scores.combined, 0.5);
    }

    #[test]
    fn test_attributes_blend_with_similarity() {
        let corpus = corpus();
        let query = NormalizedEmbedding::try_from(vec![1., 0., 0.]).unwrap();

        let recommendations =
            system().recommend_by_attributes(&corpus, &attributes([1, 1, 1, 1]), &query);

        // perfect attribute match and perfect similarity
        assert_eq!(recommendations[0].entry.text, "calm");
        assert_approx_eq!(f32, recommendations[0].scores.combined, 1.);
        assert_approx_eq!(f32, recommendations[0].scores.similarity, 1.);
        assert_approx_eq!(
            f32,
            recommendations[0].scores.attribute_match.unwrap(),
            1.
        );
        // all scores stay within the blended bounds for nonnegative similarity
        for recommendation in &recommendations {
            assert!((0. ..=1.).contains(&recommendation.scores.combined));
        }
    }

    #[test]
    fn test_mismatched_embeddings_are_skipped() {
        let corpus = Corpus::from_entries(vec![
            entry("fits", Label::Positive, [3, 3, 3, 3], vec![1., 0.]),
            entry("too long", Label::Positive, [3, 3, 3, 3], vec![1., 0., 0.]),
        ]);
        let query = NormalizedEmbedding::try_from(vec![1., 0.]).unwrap();

        let recommendations = system().recommend_by_similarity(&corpus, &query, None);
        assert_eq!(recommendations.len(), 1);
        assert_eq!(recommendations[0].entry.text, "fits");

        let recommendations =
            system().recommend_by_attributes(&corpus, &Attributes::neutral(), &query);
        assert_eq!(recommendations.len(), 1);
        assert_eq!(recommendations[0].entry.text, "fits");
    }
}
