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

use ndarray::{s, Array1, Array2, ArrayView, Ix3};

use crate::embedding::Embedding1;

/// An average token pooling strategy.
///
/// The embedding is pooled over its averaged, active tokens.
pub(crate) struct AveragePooler;

impl AveragePooler {
    /// Pools the prediction over its averaged, active tokens.
    pub(crate) fn pool(
        prediction: &ArrayView<'_, f32, Ix3>,
        attention_mask: &Array2<i64>,
    ) -> Embedding1 {
        #[allow(clippy::cast_precision_loss)] // values are only 0 or 1
        let attention_mask = attention_mask.row(0).mapv(|v| v as f32);
        let count = attention_mask.sum();

        let average = if count > 0. {
            attention_mask.dot(&prediction.slice(s![0, .., ..])) / count
        } else {
            Array1::default(prediction.shape()[2])
        };

        average.into()
    }
}
