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

use std::cmp::Ordering;

/// Allows comparing and sorting f32 even if `NaN` is involved.
///
/// Pretend that f32 has a total ordering.
///
/// `NaN` is treated as the lowest possible value, similar to what [`f32::max`] does.
///
/// If this is used for sorting this will lead to an ascending order, like
/// for example `[NaN, 0.5, 1.5, 2.0]`.
#[allow(clippy::trivially_copy_pass_by_ref)]
// we allow the lint because we may want to use the function for `std::slice::sort_by`
pub(crate) fn nan_safe_f32_cmp(a: &f32, b: &f32) -> Ordering {
    a.partial_cmp(b).unwrap_or_else(|| {
        // if `partial_cmp` returns None we have at least one `NaN`
        match (a.is_nan(), b.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, _) => Ordering::Less,
            (_, true) => Ordering::Greater,
            _ => unreachable!("partial_cmp returned None but both numbers are not NaN"),
        }
    })
}

/// `nan_safe_f32_cmp` with the parameters switched around, for sorting in
/// descending order, like e.g. `[2.0, 1.5, 0.5, NaN]`.
#[allow(clippy::trivially_copy_pass_by_ref)]
pub(crate) fn nan_safe_f32_cmp_desc(a: &f32, b: &f32) -> Ordering {
    nan_safe_f32_cmp(b, a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nan_safe_f32_cmp_sorts_in_the_right_order() {
        let mut data = vec![f32::NAN, 1., 5., f32::NAN, 4.];
        data.sort_by(nan_safe_f32_cmp);

        assert!(data[0].is_nan());
        assert!(data[1].is_nan());
        assert_eq!(&data[2..], &[1., 4., 5.]);

        data.sort_by(nan_safe_f32_cmp_desc);

        assert_eq!(&data[..3], &[5., 4., 1.]);
        assert!(data[3].is_nan());
        assert!(data[4].is_nan());
    }

    #[test]
    fn test_nan_safe_f32_cmp_nans_compare_as_equal() {
        assert_eq!(nan_safe_f32_cmp(&f32::NAN, &f32::NAN), Ordering::Equal);
        assert_eq!(nan_safe_f32_cmp(&f32::NAN, &1.), Ordering::Less);
        assert_eq!(nan_safe_f32_cmp(&1., &f32::NAN), Ordering::Greater);
    }
}
