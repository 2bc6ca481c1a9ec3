use crate::{Address, TypeRef};

/// A typed view of an object in the inspected process image.
///
/// Values are cheap handles; they do not own or copy the object's contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value {
    address: Address,
    ty: TypeRef,
}

impl Value {
    #[inline]
    #[must_use]
    pub fn new(address: Address, ty: TypeRef) -> Self {
        Self { address, ty }
    }

    #[inline]
    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    #[inline]
    #[must_use]
    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    /// Reinterpret the object at the same address as another type.
    #[inline]
    #[must_use]
    pub fn cast(&self, ty: TypeRef) -> Value {
        Value {
            address: self.address,
            ty,
        }
    }
}

/// One key/value pair produced by an associative container's enumerator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: Value,
    pub value: Value,
}

pub type Elements<'a> = Box<dyn Iterator<Item = Result<Value, crate::HostError>> + 'a>;
pub type Entries<'a> = Box<dyn Iterator<Item = Result<Entry, crate::HostError>> + 'a>;
