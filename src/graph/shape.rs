use std::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};

/// One spatial dimension as far as graph construction can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dim {
    Fixed(i64),
    /// The input's runtime size multiplied by `scale`.
    Dynamic { scale: i64 },
    Unknown,
}

impl Dim {
    pub const fn dynamic() -> Self {
        Dim::Dynamic { scale: 1 }
    }

    pub fn from_option(size: Option<i64>) -> Self {
        match size {
            Some(n) => Dim::Fixed(n),
            None => Dim::dynamic(),
        }
    }

    pub fn times(self, factor: i64) -> Self {
        match self {
            Dim::Fixed(n) => Dim::Fixed(n * factor),
            Dim::Dynamic { scale } => Dim::Dynamic { scale: scale * factor },
            Dim::Unknown => Dim::Unknown,
        }
    }

    /// Size after a VALID convolution with the given kernel. `None` when the
    /// result would be empty.
    pub fn shrink(self, kernel_size: i64) -> Option<Self> {
        match self {
            Dim::Fixed(n) if n - kernel_size + 1 < 1 => None,
            Dim::Fixed(n) => Some(Dim::Fixed(n - kernel_size + 1)),
            _ if kernel_size == 1 => Some(self),
            _ => Some(Dim::Unknown),
        }
    }

    /// Concrete size for a given runtime input size.
    pub fn resolve(self, input_size: i64) -> Option<i64> {
        match self {
            Dim::Fixed(n) => Some(n),
            Dim::Dynamic { scale } => Some(input_size * scale),
            Dim::Unknown => None,
        }
    }
}

impl Display for Dim {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Dim::Fixed(n) => write!(f, "{}", n),
            Dim::Dynamic { scale: 1 } => write!(f, "None"),
            Dim::Dynamic { scale } => write!(f, "None*{}", scale),
            Dim::Unknown => write!(f, "?"),
        }
    }
}

/// Channels-last feature map shape `(batch, height, width, channels)`.
/// The batch dimension is always dynamic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shape {
    pub height: Dim,
    pub width: Dim,
    pub channels: i64,
}

impl Shape {
    pub const fn new(height: Dim, width: Dim, channels: i64) -> Self {
        Shape { height, width, channels }
    }

    pub fn with_channels(self, channels: i64) -> Self {
        Shape { channels, ..self }
    }

    pub fn is_pooled(&self) -> bool {
        self.height == Dim::Fixed(1) && self.width == Dim::Fixed(1)
    }
}

impl Display for Shape {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "(None, {}, {}, {})", self.height, self.width, self.channels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dynamic_dims_compound() {
        let dim = Dim::dynamic().times(2).times(2);
        assert_eq!(dim, Dim::Dynamic { scale: 4 });
        assert_eq!(dim.resolve(7), Some(28));
        assert_eq!(dim.to_string(), "None*4");
    }

    #[test]
    fn test_valid_shrink() {
        assert_eq!(Dim::Fixed(5).shrink(3), Some(Dim::Fixed(3)));
        assert_eq!(Dim::Fixed(2).shrink(3), None);
        assert_eq!(Dim::dynamic().shrink(3), Some(Dim::Unknown));
        assert_eq!(Dim::dynamic().shrink(1), Some(Dim::dynamic()));
    }

    #[test]
    fn test_shape_display() {
        let shape = Shape::new(Dim::dynamic(), Dim::Fixed(8), 64);
        assert_eq!(shape.to_string(), "(None, None, 8, 64)");
    }
}
