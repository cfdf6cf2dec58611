// SPDX-License-Identifier: MIT OR Apache-2.0
//! Operand width resolution for binary operations.

use crate::expression::{DimensionError, Expression};
use crate::slot::Dimension;

/// Width assumed for an unconnected vector input
pub const UNCONNECTED_DIMENSION: Dimension = Dimension::Vec4;

/// Pair two optional operands for an elementwise binary operation.
///
/// - An absent operand becomes a zero literal of [`UNCONNECTED_DIMENSION`].
/// - Equal widths pass through.
/// - Two vectors of different widths: the wider is swizzled down.
/// - A scalar next to a vector passes through untouched, the shading
///   language broadcasts it.
pub fn resolve_input_expressions(
    a: Option<Expression>,
    b: Option<Expression>,
) -> (Expression, Expression) {
    let a = a.unwrap_or_else(unconnected);
    let b = b.unwrap_or_else(unconnected);

    let (da, db) = (a.dimension(), b.dimension());
    if da == db || da.is_scalar() || db.is_scalar() {
        return (a, b);
    }

    if da > db {
        (a.select_leading(db), b)
    } else {
        let narrowed = b.select_leading(da);
        (a, narrowed)
    }
}

/// Check that a resolved pair can be combined elementwise and return the
/// width of the result
pub fn elementwise_dimension(a: &Expression, b: &Expression) -> Result<Dimension, DimensionError> {
    let (da, db) = (a.dimension(), b.dimension());
    if da == db || da.is_scalar() || db.is_scalar() {
        Ok(da.max(db))
    } else {
        Err(DimensionError::Mismatch { left: da, right: db })
    }
}

fn unconnected() -> Expression {
    Expression::literal(UNCONNECTED_DIMENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(pair: &(Expression, Expression)) -> (usize, usize) {
        (pair.0.dimension().width(), pair.1.dimension().width())
    }

    fn lit(width: usize) -> Option<Expression> {
        Some(Expression::literal(Dimension::from_width(width).unwrap()))
    }

    #[test]
    fn test_equal_widths() {
        assert_eq!(dims(&resolve_input_expressions(lit(4), lit(4))), (4, 4));
        assert_eq!(dims(&resolve_input_expressions(lit(1), lit(1))), (1, 1));
    }

    #[test]
    fn test_vectors_trim_to_narrower() {
        let resolved = resolve_input_expressions(lit(3), lit(2));
        assert_eq!(dims(&resolved), (2, 2));
        assert!(resolved.0.is_literal());

        let a = Expression::new("a", Dimension::Vec2);
        let b = Expression::new("b", Dimension::Vec4);
        let (a, b) = resolve_input_expressions(Some(a), Some(b));
        assert_eq!(a.symbol(), "a");
        assert_eq!(b.symbol(), "b.rg");
    }

    #[test]
    fn test_scalar_broadcast_untouched() {
        assert_eq!(dims(&resolve_input_expressions(lit(3), lit(1))), (3, 1));
        assert_eq!(dims(&resolve_input_expressions(lit(1), lit(4))), (1, 4));
    }

    #[test]
    fn test_absent_defaults_to_vec4() {
        assert_eq!(dims(&resolve_input_expressions(None, lit(1))), (4, 1));
        let (a, b) = resolve_input_expressions(None, None);
        assert_eq!(a, Expression::literal(Dimension::Vec4));
        assert_eq!(b, Expression::literal(Dimension::Vec4));
    }

    #[test]
    fn test_absent_trimmed_against_vector() {
        let uv = Expression::new("in.uv", Dimension::Vec2);
        let (a, b) = resolve_input_expressions(Some(uv), None);
        assert_eq!(a.symbol(), "in.uv");
        assert_eq!(b, Expression::literal(Dimension::Vec2));
    }

    #[test]
    fn test_elementwise_dimension() {
        let v3 = Expression::new("v", Dimension::Vec3);
        let s = Expression::new("s", Dimension::Scalar);
        let v2 = Expression::new("w", Dimension::Vec2);
        assert_eq!(elementwise_dimension(&v3, &s), Ok(Dimension::Vec3));
        assert_eq!(elementwise_dimension(&s, &s), Ok(Dimension::Scalar));
        assert_eq!(
            elementwise_dimension(&v3, &v2),
            Err(DimensionError::Mismatch {
                left: Dimension::Vec3,
                right: Dimension::Vec2,
            })
        );
    }
}
