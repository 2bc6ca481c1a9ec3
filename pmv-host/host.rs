use ahash::HashSet;

use crate::{Elements, Entries, HostError, Type, TypeCode, TypeRef, Value};

/// Abstract interface to the inspection host (the debugger) and the process
/// image it owns.
///
/// Renderers never read memory directly; everything goes through this trait.
/// All methods are read-only with respect to the inspected process.
///
/// The container enumerators are optional capabilities: a host returns `None`
/// when it has no way to enumerate a value, which callers treat as "no
/// entries" rather than an error.
pub trait Host {
    /// Find a type by its fully qualified name.
    fn lookup_type(&self, name: &str) -> Option<TypeRef>;

    /// Access a data member of a struct value, including members inherited
    /// from base classes.
    fn field(&self, value: &Value, name: &str) -> Result<Value, HostError>;

    /// Read an unsigned integer value.
    fn read_unsigned(&self, value: &Value) -> Result<u64, HostError>;

    /// Read an enum value as the host prints it, i.e. the fully qualified
    /// enumerator name, or the raw integer when no enumerator matches.
    fn read_enumerator(&self, value: &Value) -> Result<String, HostError>;

    /// Read the raw bytes backing a value.
    fn read_bytes(&self, value: &Value) -> Result<Vec<u8>, HostError>;

    /// Follow a pointer or reference.
    fn dereference(&self, value: &Value) -> Result<Value, HostError>;

    /// The element count stored in a container's own bookkeeping. This is
    /// not necessarily the number of elements an enumerator would produce
    /// for a corrupted container.
    fn element_count(&self, value: &Value) -> Result<u64, HostError>;

    /// Enumerate the elements of a sequence container.
    fn elements(&self, value: &Value) -> Option<Elements<'_>>;

    /// Enumerate the key/value pairs of an associative container.
    fn entries(&self, value: &Value) -> Option<Entries<'_>>;

    /// Generic formatting of a value, as the host would print it without any
    /// custom printer. Never fails; unreadable values produce an error
    /// placeholder in the text.
    fn format(&self, value: &Value) -> String;

    /// Find a named global in the process image.
    fn symbol(&self, name: &str) -> Option<Value> {
        _ = name;
        None
    }

    /// Names of all globals known to the host.
    fn symbols(&self) -> Vec<String> {
        Vec::new()
    }

    fn resolve_type(&self, name: &str) -> Result<TypeRef, HostError> {
        self.lookup_type(name)
            .ok_or_else(|| HostError::NoSuchType(name.to_owned()))
    }

    /// The pointee, referent, or aliased type of `ty`.
    fn target_type(&self, ty: &Type) -> Result<TypeRef, HostError> {
        let Some(target) = ty.target.as_deref() else {
            return Err(HostError::TypeMismatch {
                ty: ty.name.clone(),
                expected: "a pointer, reference, or alias",
            });
        };
        self.resolve_type(target)
    }

    fn strip_typedefs(&self, ty: &TypeRef) -> Result<TypeRef, HostError> {
        strip_while(self, ty, |code| code == TypeCode::Typedef)
    }

    /// Strip references, cv-qualifiers and typedefs, in any nesting order.
    fn basic_type(&self, ty: &TypeRef) -> Result<TypeRef, HostError> {
        strip_while(self, ty, |code| {
            matches!(
                code,
                TypeCode::Reference | TypeCode::Const | TypeCode::Typedef
            )
        })
    }

    /// Find the nested member type `<ty>::<member>`, searching upward
    /// through first base classes when the type itself does not declare it.
    fn find_member_type(&self, ty: &TypeRef, member: &str) -> Result<TypeRef, HostError> {
        let mut current = self.strip_typedefs(ty)?;
        let mut visited = HashSet::default();
        loop {
            if !visited.insert(current.name.clone()) {
                tracing::warn!("base classes of {} form a cycle", ty.name);
                return Err(HostError::CannotFindMember {
                    ty: ty.name.clone(),
                    member: member.to_owned(),
                });
            }

            let search = format!("{}::{member}", current.name);
            if let Some(found) = self.lookup_type(&search) {
                return Ok(found);
            }

            // Only the first base class is considered.
            let Some(base) = current.fields.first().filter(|f| f.is_base_class) else {
                return Err(HostError::CannotFindMember {
                    ty: ty.name.clone(),
                    member: member.to_owned(),
                });
            };
            tracing::trace!("{search} not found, trying base class {}", base.ty);
            current = self.strip_typedefs(&self.resolve_type(&base.ty)?)?;
        }
    }
}

/// Follow `target` while `strip` accepts the type's code. A chain that
/// returns to a type it already passed fails with [`HostError::TypeCycle`].
fn strip_while<H: Host + ?Sized>(
    host: &H,
    ty: &TypeRef,
    strip: impl Fn(TypeCode) -> bool,
) -> Result<TypeRef, HostError> {
    let mut ty = ty.clone();
    let mut visited = HashSet::default();
    while strip(ty.code) {
        if !visited.insert(ty.name.clone()) {
            return Err(HostError::TypeCycle(ty.name.clone()));
        }
        ty = host.target_type(&ty)?;
    }
    Ok(ty)
}
