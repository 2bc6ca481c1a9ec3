use std::fmt::Write as _;

use ahash::{HashMap, HashSet};
use indexmap::IndexMap;

use crate::{
    Address, Elements, Entries, Entry, Host, HostError, SnapshotError, Type, TypeCode, TypeRef,
    Value,
};

/// Contents of one object in a [`Snapshot`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum Object {
    Unsigned(u64),
    /// Fully qualified enumerator name, e.g. `ns::Enum::Variant`.
    Enumerator(String),
    Bytes(Vec<u8>),
    Text(String),
    Pointer(Address),
    /// Member name to the address of the member's storage.
    Struct(IndexMap<String, Address>),
    Sequence(Vec<Address>),
    Map(MapObject),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MapObject {
    /// The container's own size field.
    pub len: u64,
    /// Key address, value address.
    pub entries: Vec<(Address, Address)>,
}

impl MapObject {
    /// A well-formed map, where the size field agrees with the entries.
    #[must_use]
    pub fn new(entries: Vec<(Address, Address)>) -> Self {
        Self {
            len: entries.len() as u64,
            entries,
        }
    }
}

/// On-disk representation of a snapshot.
#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
struct SnapshotFile {
    #[serde(default)]
    types: Vec<Type>,
    #[serde(default)]
    objects: Vec<ObjectRecord>,
    #[serde(default)]
    symbols: Vec<SymbolRecord>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct ObjectRecord {
    address: Address,
    object: Object,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct SymbolRecord {
    name: String,
    address: Address,
    #[serde(rename = "type")]
    ty: String,
}

/// An immutable process image held in memory, e.g. extracted from a core
/// dump.
///
/// This is the host used by the `pmv` command-line tool and by tests. Reads
/// of missing objects fail with [`HostError::InvalidAddress`], like reads of
/// unmapped memory in a live process.
#[derive(Debug, Default)]
pub struct Snapshot {
    types: IndexMap<String, TypeRef>,
    objects: HashMap<Address, Object>,
    symbols: IndexMap<String, (Address, String)>,
}

/// Maximum nesting of struct members in generic formatting.
const FORMAT_DEPTH: usize = 2;

impl Snapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let file: SnapshotFile = serde_json::from_str(json)?;

        let mut snapshot = Snapshot::new();
        for ty in file.types {
            if snapshot.types.contains_key(&ty.name) {
                return Err(SnapshotError::DuplicateType(ty.name));
            }
            snapshot.define_type(ty);
        }
        for record in file.objects {
            if snapshot.insert(record.address, record.object).is_some() {
                return Err(SnapshotError::DuplicateObject(record.address));
            }
        }
        for symbol in file.symbols {
            snapshot
                .symbols
                .insert(symbol.name, (symbol.address, symbol.ty));
        }

        snapshot.validate()?;
        tracing::debug!(
            types = snapshot.types.len(),
            objects = snapshot.objects.len(),
            symbols = snapshot.symbols.len(),
            "Loaded snapshot",
        );
        Ok(snapshot)
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        let mut objects = self
            .objects
            .iter()
            .map(|(address, object)| ObjectRecord {
                address: *address,
                object: object.clone(),
            })
            .collect::<Vec<_>>();
        objects.sort_by_key(|record| record.address);

        let file = SnapshotFile {
            types: self.types.values().map(|ty| Type::clone(ty)).collect(),
            objects,
            symbols: self
                .symbols
                .iter()
                .map(|(name, (address, ty))| SymbolRecord {
                    name: name.clone(),
                    address: *address,
                    ty: ty.clone(),
                })
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// Check that every type referred to by another type is defined, and that
    /// no alias or base class chain loops.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        for ty in self.types.values() {
            let container_args: &[String] = match ty.code {
                TypeCode::Sequence => &ty.template_args[..ty.template_args.len().min(1)],
                TypeCode::Map => &ty.template_args[..ty.template_args.len().min(2)],
                _ => &[],
            };
            let referenced = ty
                .target
                .iter()
                .chain(ty.fields.iter().map(|f| &f.ty))
                .chain(container_args);
            for name in referenced {
                if !self.types.contains_key(name) {
                    return Err(SnapshotError::UndefinedType {
                        referrer: ty.name.clone(),
                        name: name.clone(),
                    });
                }
            }
        }

        for ty in self.types.values() {
            self.check_inheritance(ty, &mut Vec::new())?;
        }
        Ok(())
    }

    /// Fail if an alias chain or the base classes of `ty` lead back to a type
    /// on `path`.
    fn check_inheritance(
        &self,
        ty: &TypeRef,
        path: &mut Vec<String>,
    ) -> Result<(), SnapshotError> {
        let ty = self.basic_type(ty)?;
        if path.contains(&ty.name) {
            return Err(SnapshotError::TypeCycle(ty.name.clone()));
        }
        path.push(ty.name.clone());
        for base in ty.base_classes() {
            self.check_inheritance(&self.resolve_type(&base.ty)?, path)?;
        }
        path.pop();
        Ok(())
    }

    /// Define (or redefine) a type.
    pub fn define_type(&mut self, ty: Type) -> TypeRef {
        let ty = TypeRef::new(ty);
        self.types.insert(ty.name.clone(), ty.clone());
        ty
    }

    /// Place an object in the image, returning the object previously stored
    /// at that address.
    pub fn insert(&mut self, address: Address, object: Object) -> Option<Object> {
        self.objects.insert(address, object)
    }

    pub fn add_symbol(&mut self, name: impl Into<String>, value: &Value) {
        self.symbols
            .insert(name.into(), (value.address(), value.ty().name.clone()));
    }

    /// A typed view of the object at `address`.
    pub fn value(&self, address: Address, type_name: &str) -> Result<Value, HostError> {
        Ok(Value::new(address, self.resolve_type(type_name)?))
    }

    fn object(&self, address: Address) -> Result<&Object, HostError> {
        self.objects
            .get(&address)
            .ok_or(HostError::InvalidAddress(address))
    }

    fn container_arg(&self, ty: &Type, index: usize) -> Result<TypeRef, HostError> {
        let Some(arg) = ty.template_arg(index) else {
            return Err(HostError::TypeMismatch {
                ty: ty.name.clone(),
                expected: "a fully specified container",
            });
        };
        self.resolve_type(arg)
    }

    /// Field lookup through base classes. `visited` holds the struct types
    /// already searched, so cyclic inheritance ends the search.
    fn find_field(
        &self,
        value: &Value,
        name: &str,
        visited: &mut HashSet<String>,
    ) -> Result<Value, HostError> {
        let ty = self.basic_type(value.ty())?;
        if ty.code != TypeCode::Struct {
            return Err(HostError::TypeMismatch {
                ty: ty.name.clone(),
                expected: "a struct",
            });
        }
        let Object::Struct(members) = self.object(value.address())? else {
            return Err(HostError::TypeMismatch {
                ty: ty.name.clone(),
                expected: "a struct",
            });
        };

        if let Some(field) = ty.field(name) {
            let address = members
                .get(name)
                .copied()
                .ok_or_else(|| HostError::NoSuchField {
                    ty: ty.name.clone(),
                    member: name.to_owned(),
                })?;
            return Ok(Value::new(address, self.resolve_type(&field.ty)?));
        }

        if !visited.insert(ty.name.clone()) {
            tracing::warn!("base classes of {} form a cycle", ty.name);
            return Err(HostError::NoSuchField {
                ty: ty.name.clone(),
                member: name.to_owned(),
            });
        }
        for base in ty.base_classes() {
            let base_value = self.find_field(value, &base.name, visited)?;
            match self.find_field(&base_value, name, visited) {
                Err(HostError::NoSuchField { .. }) => {}
                result => return result,
            }
        }

        Err(HostError::NoSuchField {
            ty: ty.name.clone(),
            member: name.to_owned(),
        })
    }

    fn try_format(&self, value: &Value, depth: usize) -> Result<String, HostError> {
        let ty = self.basic_type(value.ty())?;
        let text = match self.object(value.address())? {
            Object::Unsigned(n) => n.to_string(),
            Object::Enumerator(name) => name.clone(),
            Object::Bytes(bytes) => {
                format!("\"{}\"", String::from_utf8_lossy(bytes).escape_debug())
            }
            Object::Text(text) => format!("\"{}\"", text.escape_debug()),
            Object::Pointer(address) => format!("({}) {address}", value.ty().name),
            Object::Sequence(elements) => format!("{} of length {}", ty.name, elements.len()),
            Object::Map(map) => format!("{} with {} elements", ty.name, map.len),
            Object::Struct(_) if depth >= FORMAT_DEPTH => String::from("{...}"),
            Object::Struct(_) => {
                let mut text = String::from("{");
                for (index, field) in ty.fields.iter().enumerate() {
                    if index != 0 {
                        text.push_str(", ");
                    }
                    let member = self.field(value, &field.name)?;
                    let member = self.try_format(&member, depth + 1)?;
                    if field.is_base_class {
                        _ = write!(text, "<{}> = {member}", field.name);
                    } else {
                        _ = write!(text, "{} = {member}", field.name);
                    }
                }
                text.push('}');
                text
            }
        };
        Ok(text)
    }
}

impl Host for Snapshot {
    #[inline]
    fn lookup_type(&self, name: &str) -> Option<TypeRef> {
        self.types.get(name).cloned()
    }

    fn field(&self, value: &Value, name: &str) -> Result<Value, HostError> {
        self.find_field(value, name, &mut HashSet::default())
    }

    fn read_unsigned(&self, value: &Value) -> Result<u64, HostError> {
        match self.object(value.address())? {
            Object::Unsigned(n) => Ok(*n),
            _ => Err(HostError::TypeMismatch {
                ty: value.ty().name.clone(),
                expected: "an unsigned integer",
            }),
        }
    }

    fn read_enumerator(&self, value: &Value) -> Result<String, HostError> {
        match self.object(value.address())? {
            Object::Enumerator(name) => Ok(name.clone()),
            // Out-of-range enum values print as their integer.
            Object::Unsigned(n) => Ok(n.to_string()),
            _ => Err(HostError::TypeMismatch {
                ty: value.ty().name.clone(),
                expected: "an enum",
            }),
        }
    }

    fn read_bytes(&self, value: &Value) -> Result<Vec<u8>, HostError> {
        match self.object(value.address())? {
            Object::Bytes(bytes) => Ok(bytes.clone()),
            Object::Text(text) => Ok(text.as_bytes().to_vec()),
            _ => Err(HostError::TypeMismatch {
                ty: value.ty().name.clone(),
                expected: "a byte array",
            }),
        }
    }

    fn dereference(&self, value: &Value) -> Result<Value, HostError> {
        let ty = self.basic_type(value.ty())?;
        match ty.code {
            // References are transparent in the image.
            TypeCode::Reference => Ok(value.cast(self.target_type(&ty)?)),
            TypeCode::Pointer => {
                let Object::Pointer(address) = self.object(value.address())? else {
                    return Err(HostError::TypeMismatch {
                        ty: ty.name.clone(),
                        expected: "a pointer",
                    });
                };
                if address.is_null() {
                    return Err(HostError::InvalidAddress(*address));
                }
                Ok(Value::new(*address, self.target_type(&ty)?))
            }
            _ => Err(HostError::TypeMismatch {
                ty: ty.name.clone(),
                expected: "a pointer",
            }),
        }
    }

    fn element_count(&self, value: &Value) -> Result<u64, HostError> {
        match self.object(value.address())? {
            Object::Sequence(elements) => Ok(elements.len() as u64),
            Object::Map(map) => Ok(map.len),
            Object::Bytes(bytes) => Ok(bytes.len() as u64),
            Object::Text(text) => Ok(text.len() as u64),
            _ => Err(HostError::TypeMismatch {
                ty: value.ty().name.clone(),
                expected: "a container",
            }),
        }
    }

    fn elements(&self, value: &Value) -> Option<Elements<'_>> {
        let ty = self.basic_type(value.ty()).ok()?;
        if ty.code != TypeCode::Sequence {
            return None;
        }

        let element_ty = match self.container_arg(&ty, 0) {
            Ok(element_ty) => element_ty,
            Err(err) => return Some(Box::new(std::iter::once(Err(err)))),
        };
        match self.object(value.address()) {
            Ok(Object::Sequence(elements)) => Some(Box::new(
                elements
                    .iter()
                    .map(move |address| Ok(Value::new(*address, element_ty.clone()))),
            )),
            Ok(_) => None,
            Err(err) => Some(Box::new(std::iter::once(Err(err)))),
        }
    }

    fn entries(&self, value: &Value) -> Option<Entries<'_>> {
        let ty = self.basic_type(value.ty()).ok()?;
        if ty.code != TypeCode::Map {
            return None;
        }

        let types = self
            .container_arg(&ty, 0)
            .and_then(|key_ty| Ok((key_ty, self.container_arg(&ty, 1)?)));
        let (key_ty, value_ty) = match types {
            Ok(types) => types,
            Err(err) => return Some(Box::new(std::iter::once(Err(err)))),
        };
        match self.object(value.address()) {
            Ok(Object::Map(map)) => Some(Box::new(map.entries.iter().map(
                move |(key, value)| {
                    Ok(Entry {
                        key: Value::new(*key, key_ty.clone()),
                        value: Value::new(*value, value_ty.clone()),
                    })
                },
            ))),
            Ok(_) => None,
            Err(err) => Some(Box::new(std::iter::once(Err(err)))),
        }
    }

    fn format(&self, value: &Value) -> String {
        self.try_format(value, 0)
            .unwrap_or_else(|err| format!("<error: {err}>"))
    }

    fn symbol(&self, name: &str) -> Option<Value> {
        let (address, ty) = self.symbols.get(name)?;
        Some(Value::new(*address, self.lookup_type(ty)?))
    }

    fn symbols(&self) -> Vec<String> {
        self.symbols.keys().cloned().collect()
    }
}
