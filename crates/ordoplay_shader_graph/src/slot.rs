// SPDX-License-Identifier: MIT OR Apache-2.0
//! Slot definitions for node inputs/outputs.

use crate::expression::{DimensionError, Expression};
use serde::{Deserialize, Serialize};

/// Vector width carried by a slot or expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Dimension {
    /// One component
    Scalar,
    /// Two components
    Vec2,
    /// Three components
    Vec3,
    /// Four components
    Vec4,
}

impl Dimension {
    /// Every dimension, narrowest first
    pub const ALL: [Dimension; 4] = [Self::Scalar, Self::Vec2, Self::Vec3, Self::Vec4];

    /// Create a dimension from a component count in `1..=4`
    pub fn from_width(width: usize) -> Result<Self, DimensionError> {
        match width {
            1 => Ok(Self::Scalar),
            2 => Ok(Self::Vec2),
            3 => Ok(Self::Vec3),
            4 => Ok(Self::Vec4),
            _ => Err(DimensionError::InvalidWidth(width)),
        }
    }

    /// Number of components
    pub fn width(self) -> usize {
        match self {
            Self::Scalar => 1,
            Self::Vec2 => 2,
            Self::Vec3 => 3,
            Self::Vec4 => 4,
        }
    }

    /// Name of the matching shading-language type
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Scalar => "float",
            Self::Vec2 => "float2",
            Self::Vec3 => "float3",
            Self::Vec4 => "float4",
        }
    }

    /// Whether this is a single component
    pub fn is_scalar(self) -> bool {
        self == Self::Scalar
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Slot direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotDirection {
    /// Input slot
    Input,
    /// Output slot
    Output,
}

/// Constant float value stored on a node or slot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Scalar
    Float(f32),
    /// 2D vector
    Float2([f32; 2]),
    /// 3D vector
    Float3([f32; 3]),
    /// 4D vector / Color
    Float4([f32; 4]),
}

impl Value {
    /// The all-zero value of a dimension
    pub fn zero(dimension: Dimension) -> Self {
        match dimension {
            Dimension::Scalar => Self::Float(0.0),
            Dimension::Vec2 => Self::Float2([0.0; 2]),
            Dimension::Vec3 => Self::Float3([0.0; 3]),
            Dimension::Vec4 => Self::Float4([0.0; 4]),
        }
    }

    /// Get the dimension of this value
    pub fn dimension(&self) -> Dimension {
        match self {
            Self::Float(_) => Dimension::Scalar,
            Self::Float2(_) => Dimension::Vec2,
            Self::Float3(_) => Dimension::Vec3,
            Self::Float4(_) => Dimension::Vec4,
        }
    }

    /// Components in channel order
    pub fn components(&self) -> &[f32] {
        match self {
            Self::Float(v) => std::slice::from_ref(v),
            Self::Float2(v) => v,
            Self::Float3(v) => v,
            Self::Float4(v) => v,
        }
    }

    /// Whether every component is zero
    pub fn is_zero(&self) -> bool {
        self.components().iter().all(|c| *c == 0.0)
    }

    /// Render as shading-language source
    pub fn render(&self) -> String {
        match self {
            Self::Float(v) => render_float(*v),
            _ => {
                let args: Vec<String> =
                    self.components().iter().map(|c| render_float(*c)).collect();
                format!("{}({})", self.dimension().type_name(), args.join(", "))
            }
        }
    }

    /// Convert to an expression; all-zero values become literals
    pub fn to_expression(&self) -> Expression {
        if self.is_zero() {
            Expression::literal(self.dimension())
        } else {
            Expression::new(self.render(), self.dimension())
        }
    }
}

/// Render a float so that it always reads as a floating-point expression
pub(crate) fn render_float(value: f32) -> String {
    // Shading languages have no literal for infinity or NaN
    if value.is_nan() {
        "(0.0 / 0.0)".to_string()
    } else if value.is_infinite() {
        let sign = if value.is_sign_negative() { "-" } else { "" };
        format!("({sign}1.0 / 0.0)")
    } else {
        // Debug keeps a trailing ".0" on integral values
        format!("{value:?}")
    }
}

/// A named slot on a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    /// Slot name, unique per direction on its node
    pub name: String,
    /// Slot direction
    pub direction: SlotDirection,
    /// Declared width
    pub dimension: Dimension,
    /// Value used when an input is left unconnected
    pub default_value: Option<Value>,
}

impl Slot {
    /// Create a new input slot
    pub fn input(name: impl Into<String>, dimension: Dimension) -> Self {
        Self {
            name: name.into(),
            direction: SlotDirection::Input,
            dimension,
            default_value: None,
        }
    }

    /// Create a new output slot
    pub fn output(name: impl Into<String>, dimension: Dimension) -> Self {
        Self {
            name: name.into(),
            direction: SlotDirection::Output,
            dimension,
            default_value: None,
        }
    }

    /// Set the default value
    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Expression substituted when this input has no connection
    pub fn default_expression(&self) -> Option<Expression> {
        self.default_value.as_ref().map(Value::to_expression)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_width_roundtrip() {
        for dimension in Dimension::ALL {
            assert_eq!(Dimension::from_width(dimension.width()).unwrap(), dimension);
        }
        assert!(matches!(Dimension::from_width(0), Err(DimensionError::InvalidWidth(0))));
        assert!(matches!(Dimension::from_width(5), Err(DimensionError::InvalidWidth(5))));
    }

    #[test]
    fn test_value_render() {
        assert_eq!(Value::Float(1.0).render(), "1.0");
        assert_eq!(Value::Float(0.25).render(), "0.25");
        assert_eq!(Value::Float3([1.0, 0.5, 0.0]).render(), "float3(1.0, 0.5, 0.0)");
    }

    #[test]
    fn test_non_finite_render() {
        assert_eq!(Value::Float(f32::INFINITY).render(), "(1.0 / 0.0)");
        assert_eq!(Value::Float(f32::NEG_INFINITY).render(), "(-1.0 / 0.0)");
        assert_eq!(Value::Float(f32::NAN).render(), "(0.0 / 0.0)");
        assert_eq!(
            Value::Float2([f32::INFINITY, 2.0]).to_expression().symbol(),
            "float2((1.0 / 0.0), 2.0)"
        );
    }

    #[test]
    fn test_zero_value_becomes_literal() {
        for dimension in Dimension::ALL {
            let zero = Value::zero(dimension);
            assert_eq!(zero.dimension(), dimension);
            assert!(zero.to_expression().is_literal());
        }

        let expr = Value::Float3([0.0; 3]).to_expression();
        assert!(expr.is_literal());
        assert_eq!(expr.dimension(), Dimension::Vec3);

        let expr = Value::Float2([0.0, 2.0]).to_expression();
        assert!(!expr.is_literal());
        assert_eq!(expr.symbol(), "float2(0.0, 2.0)");
    }

    #[test]
    fn test_slot_default_expression() {
        let slot = Slot::input("Roughness", Dimension::Scalar).with_default(Value::Float(0.5));
        assert_eq!(slot.default_expression().unwrap().symbol(), "0.5");
        assert!(Slot::input("A", Dimension::Vec4).default_expression().is_none());
    }
}
