//! Backend-agnostic bit-precise types attached to ports, signals and constants.
use serde::{Deserialize, Serialize};

/// Abstract type of a structural object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Bool,
    Int,
    Uint,
    Real,
    VectorBool,
    VectorInt,
    VectorUint,
    VectorReal,
    Other,
}

impl TypeKind {
    /// Vector of int, unsigned or real elements, sized by `NUM_ELEMENTS_` when parametrized.
    pub fn is_element_vector(&self) -> bool {
        matches!(
            self,
            TypeKind::VectorInt | TypeKind::VectorUint | TypeKind::VectorReal
        )
    }
}

/// Type of a port, signal or constant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub kind: TypeKind,
    /// Bit width. Zero means the width is not given explicitly.
    #[serde(default)]
    pub size: u64,
    /// Number of elements for vector kinds.
    #[serde(default)]
    pub vector_size: u64,
    /// Type name for [TypeKind::Other].
    #[serde(default)]
    pub id_type: String,
}

impl TypeDescriptor {
    fn sized(kind: TypeKind, size: u64) -> Self {
        Self {
            kind,
            size,
            vector_size: 0,
            id_type: String::new(),
        }
    }

    pub fn bool() -> Self {
        Self::sized(TypeKind::Bool, 1)
    }
    pub fn int(size: u64) -> Self {
        Self::sized(TypeKind::Int, size)
    }
    pub fn uint(size: u64) -> Self {
        Self::sized(TypeKind::Uint, size)
    }
    pub fn real(size: u64) -> Self {
        Self::sized(TypeKind::Real, size)
    }
    pub fn vector_bool(size: u64) -> Self {
        Self::sized(TypeKind::VectorBool, size)
    }
    pub fn vector(kind: TypeKind, size: u64, vector_size: u64) -> Self {
        Self {
            vector_size,
            ..Self::sized(kind, size)
        }
    }
    pub fn other<S: ToString>(id_type: S) -> Self {
        Self {
            id_type: id_type.to_string(),
            ..Self::sized(TypeKind::Other, 0)
        }
    }

    /// Width of one scalar, if it is known.
    pub fn explicit_size(&self) -> Option<u64> {
        match self.kind {
            TypeKind::Bool => Some(1),
            _ if self.size == 0 => None,
            _ => Some(self.size),
        }
    }

    /// Width in bits of the whole value, if it is known.
    pub fn total_size(&self) -> Option<u64> {
        let size = self.explicit_size()?;
        if self.vector_size > 0 && self.kind != TypeKind::Bool {
            Some(size * self.vector_size)
        } else {
            Some(size)
        }
    }
}

/// Direction of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    In,
    Out,
    Inout,
    Gen,
}

impl Direction {
    /// Fixed declaration order of port directions.
    pub const ORDER: [Direction; 4] =
        [Direction::In, Direction::Out, Direction::Inout, Direction::Gen];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_size_of_vectors() {
        assert_eq!(TypeDescriptor::bool().total_size(), Some(1));
        assert_eq!(TypeDescriptor::int(32).total_size(), Some(32));
        assert_eq!(
            TypeDescriptor::vector(TypeKind::VectorUint, 8, 4).total_size(),
            Some(32)
        );
        assert_eq!(TypeDescriptor::uint(0).total_size(), None);
    }
}
