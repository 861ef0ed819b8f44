/// The primitive LLVM types the compiler manipulates.
///
/// `Ptr` is the opaque pointer type; it only occurs as the type of
/// stack slots and of the format-string globals passed to `printf`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    I1,
    I32,
    F64,
    Ptr,
}

impl Type {
    /// Whether arithmetic and comparison accept values of this type.
    #[must_use]
    pub fn is_numeric(self) -> bool {
        matches!(self, Type::I32 | Type::F64)
    }

    #[must_use]
    pub fn is_integer(self) -> bool {
        matches!(self, Type::I1 | Type::I32)
    }
}
