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

use displaydoc::Display;

/// A fallback applied while resolving user input.
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub enum Fallback {
    /// unrecognized preference {input:?}, assuming a positive preference
    Preference { input: String },
    /// invalid {attribute} rating {input:?}, assuming the neutral rating 3
    Rating {
        attribute: &'static str,
        input: String,
    },
}

/// A value resolved from user input.
///
/// Invalid input never fails the query, it resolves to a default value
/// instead and records the applied [`Fallback`].
#[derive(Clone, Debug)]
#[must_use]
pub struct Resolved<T> {
    pub value: T,
    pub fallback: Option<Fallback>,
}

impl<T> Resolved<T> {
    pub(crate) fn exact(value: T) -> Self {
        Self {
            value,
            fallback: None,
        }
    }

    pub(crate) fn fallback(value: T, fallback: Fallback) -> Self {
        Self {
            value,
            fallback: Some(fallback),
        }
    }
}
