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

use soulsoup_bert::{NormalizedEmbedding, Pipeline};

pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Turns a text into a normalized embedding.
///
/// The corpus loader embeds missing quote vectors with it and the query side
/// embeds mood texts with it.
pub trait TextEmbedder {
    fn embed(&self, text: &str) -> Result<NormalizedEmbedding, BoxedError>;
}

impl TextEmbedder for Pipeline {
    fn embed(&self, text: &str) -> Result<NormalizedEmbedding, BoxedError> {
        Ok(self.run(text)?.normalize()?)
    }
}
