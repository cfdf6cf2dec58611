// SPDX-License-Identifier: MIT OR Apache-2.0
//! Symbolic shader expressions and the swizzle/widen algebra.
//!
//! An [`Expression`] is an immutable piece of shading-language source text
//! paired with its vector width. The all-zero [`Expression::Literal`] is kept
//! apart from ordinary symbols so that narrowing or widening it collapses to
//! another zero constant instead of nesting constructors.

use crate::slot::{render_float, Dimension};
use std::borrow::Cow;

/// Channel labels in selection order
const CHANNELS: [char; 4] = ['r', 'g', 'b', 'a'];

/// A synthesized shader sub-expression
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expression {
    /// Arbitrary source text of a given width
    Symbol {
        /// Source text
        symbol: String,
        /// Width
        dimension: Dimension,
    },
    /// All-zero constant of a given width
    Literal(Dimension),
}

impl Expression {
    /// Create a symbolic expression
    pub fn new(symbol: impl Into<String>, dimension: Dimension) -> Self {
        Self::Symbol {
            symbol: symbol.into(),
            dimension,
        }
    }

    /// Create an all-zero constant
    pub fn literal(dimension: Dimension) -> Self {
        Self::Literal(dimension)
    }

    /// Width of this expression
    pub fn dimension(&self) -> Dimension {
        match self {
            Self::Symbol { dimension, .. } | Self::Literal(dimension) => *dimension,
        }
    }

    /// Whether this is the zero literal
    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }

    /// Rendered source text
    pub fn symbol(&self) -> Cow<'_, str> {
        match self {
            Self::Symbol { symbol, .. } => Cow::Borrowed(symbol),
            Self::Literal(dimension) => Cow::Owned(format!(
                "{}({})",
                dimension.type_name(),
                render_float(0.0)
            )),
        }
    }

    /// Select the first `dimension` channels.
    ///
    /// A literal narrows to a smaller literal rather than a channel access.
    pub fn swizzle(&self, dimension: Dimension) -> Result<Self, DimensionError> {
        if dimension > self.dimension() {
            return Err(DimensionError::SwizzleTooWide {
                from: self.dimension(),
                to: dimension,
            });
        }

        Ok(self.select_leading(dimension))
    }

    /// Swizzle without the width check; callers guarantee `dimension` fits
    pub(crate) fn select_leading(&self, dimension: Dimension) -> Self {
        match self {
            Self::Literal(_) => Self::Literal(dimension),
            Self::Symbol { symbol, .. } => {
                let channels: String = CHANNELS[..dimension.width()].iter().collect();
                Self::new(format!("{symbol}.{channels}"), dimension)
            }
        }
    }

    /// Embed in a wider constructor, padding the new channels with zeros.
    ///
    /// A literal widens to a wider literal.
    pub fn widen(&self, dimension: Dimension) -> Result<Self, DimensionError> {
        if dimension <= self.dimension() {
            return Err(DimensionError::WidenTooNarrow {
                from: self.dimension(),
                to: dimension,
            });
        }

        Ok(match self {
            Self::Literal(_) => Self::Literal(dimension),
            Self::Symbol { symbol, dimension: own } => {
                let mut args = vec![symbol.clone()];
                args.extend((own.width()..dimension.width()).map(|_| render_float(0.0)));
                Self::new(format!("{}({})", dimension.type_name(), args.join(", ")), dimension)
            }
        })
    }

    /// Narrow or widen to exactly `dimension`
    pub fn coerce(&self, dimension: Dimension) -> Result<Self, DimensionError> {
        match dimension.cmp(&self.dimension()) {
            std::cmp::Ordering::Equal => Ok(self.clone()),
            std::cmp::Ordering::Less => self.swizzle(dimension),
            std::cmp::Ordering::Greater => self.widen(dimension),
        }
    }

    /// Select a single channel by index as a scalar
    pub fn channel(&self, index: usize) -> Result<Self, DimensionError> {
        if index >= self.dimension().width() {
            return Err(DimensionError::ChannelOutOfRange {
                channel: index,
                dimension: self.dimension(),
            });
        }

        Ok(match self {
            Self::Literal(_) => Self::Literal(Dimension::Scalar),
            Self::Symbol { symbol, .. } => {
                Self::new(format!("{symbol}.{}", CHANNELS[index]), Dimension::Scalar)
            }
        })
    }
}

impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.symbol())
    }
}

/// Error when expression widths cannot be reconciled
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DimensionError {
    /// Width outside `1..=4`
    #[error("Unsupported vector width: {0}")]
    InvalidWidth(usize),

    /// Swizzle target wider than the source
    #[error("Cannot swizzle {from} down to {to}")]
    SwizzleTooWide {
        /// Source width
        from: Dimension,
        /// Requested width
        to: Dimension,
    },

    /// Widen target not wider than the source
    #[error("Cannot widen {from} to {to}")]
    WidenTooNarrow {
        /// Source width
        from: Dimension,
        /// Requested width
        to: Dimension,
    },

    /// Channel index past the last component
    #[error("Channel {channel} out of range for {dimension}")]
    ChannelOutOfRange {
        /// Requested channel
        channel: usize,
        /// Source width
        dimension: Dimension,
    },

    /// Operand widths an operation cannot combine
    #[error("Operand widths {left} and {right} cannot be combined")]
    Mismatch {
        /// Left operand width
        left: Dimension,
        /// Right operand width
        right: Dimension,
    },

    /// Produced width disagrees with the declared slot width
    #[error("Slot declared as {declared} but produced {actual}")]
    DeclaredMismatch {
        /// Declared width
        declared: Dimension,
        /// Produced width
        actual: Dimension,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn color() -> Expression {
        Expression::new("albedo", Dimension::Vec4)
    }

    #[test]
    fn test_swizzle_symbol() {
        let e = color();
        for (dimension, channels) in [
            (Dimension::Scalar, "r"),
            (Dimension::Vec2, "rg"),
            (Dimension::Vec3, "rgb"),
            (Dimension::Vec4, "rgba"),
        ] {
            let swizzled = e.swizzle(dimension).unwrap();
            assert_eq!(swizzled.dimension(), dimension);
            assert_eq!(swizzled.symbol(), format!("albedo.{channels}"));
        }
        assert_eq!(e.dimension(), Dimension::Vec4);
    }

    #[test]
    fn test_swizzle_too_wide() {
        let e = Expression::new("uv", Dimension::Vec2);
        assert_eq!(
            e.swizzle(Dimension::Vec3),
            Err(DimensionError::SwizzleTooWide {
                from: Dimension::Vec2,
                to: Dimension::Vec3,
            })
        );
    }

    #[test]
    fn test_swizzle_literal() {
        let literal = Expression::literal(Dimension::Vec3);
        let narrowed = literal.swizzle(Dimension::Vec2).unwrap();
        assert_eq!(narrowed, Expression::literal(Dimension::Vec2));
        assert_eq!(narrowed.symbol(), "float2(0.0)");

        let scalar = Expression::literal(Dimension::Scalar).swizzle(Dimension::Scalar).unwrap();
        assert!(scalar.is_literal());
        assert_eq!(scalar.symbol(), "float(0.0)");
    }

    #[test]
    fn test_widen_symbol() {
        let uv = Expression::new("uv", Dimension::Vec2);
        let widened = uv.widen(Dimension::Vec4).unwrap();
        assert_eq!(widened.dimension(), Dimension::Vec4);
        assert_eq!(widened.symbol(), "float4(uv, 0.0, 0.0)");

        let t = Expression::new("t", Dimension::Scalar);
        assert_eq!(t.widen(Dimension::Vec3).unwrap().symbol(), "float3(t, 0.0, 0.0)");
    }

    #[test]
    fn test_widen_literal() {
        let widened = Expression::literal(Dimension::Vec2).widen(Dimension::Vec4).unwrap();
        assert_eq!(widened, Expression::literal(Dimension::Vec4));
        assert_eq!(widened.symbol(), "float4(0.0)");
    }

    #[test]
    fn test_widen_too_narrow() {
        assert!(matches!(
            color().widen(Dimension::Vec4),
            Err(DimensionError::WidenTooNarrow { .. })
        ));
    }

    #[test]
    fn test_coerce() {
        let n = Expression::new("n", Dimension::Vec3);
        assert_eq!(n.coerce(Dimension::Vec3).unwrap(), n);
        assert_eq!(n.coerce(Dimension::Scalar).unwrap().symbol(), "n.r");
        assert_eq!(n.coerce(Dimension::Vec4).unwrap().symbol(), "float4(n, 0.0)");
    }

    #[test]
    fn test_channel() {
        let e = color();
        assert_eq!(e.channel(2).unwrap().symbol(), "albedo.b");
        assert_eq!(e.channel(2).unwrap().dimension(), Dimension::Scalar);
        assert!(Expression::literal(Dimension::Vec4).channel(3).unwrap().is_literal());
        assert!(matches!(
            Expression::new("x", Dimension::Vec2).channel(2),
            Err(DimensionError::ChannelOutOfRange { channel: 2, .. })
        ));
    }
}
