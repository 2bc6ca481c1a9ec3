use std::sync::Arc;

pub type TypeRef = Arc<Type>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TypeCode {
    Struct,
    Enum,
    Int,
    Pointer,
    Reference,
    /// A cv-qualified view of `target`.
    Const,
    Typedef,
    /// Contiguous container of `template_args[0]`.
    Sequence,
    /// Associative container from `template_args[0]` to `template_args[1]`.
    Map,
}

/// Type information as reported by the host.
///
/// Related types are referred to by name and resolved lazily through the
/// host, so recursive types (a node holding pointers to nodes) need no
/// special treatment.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Type {
    pub name: String,
    pub code: TypeCode,
    /// Pointee, referent, qualified or aliased type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub template_args: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_base_class: bool,
}

impl Type {
    #[must_use]
    pub fn new(name: impl Into<String>, code: TypeCode) -> Self {
        Self {
            name: name.into(),
            code,
            target: None,
            fields: Vec::new(),
            template_args: Vec::new(),
        }
    }

    #[must_use]
    pub fn structure(name: impl Into<String>) -> Self {
        Self::new(name, TypeCode::Struct)
    }

    #[must_use]
    pub fn pointer_to(target: &str) -> Self {
        Self::new(format!("{target} *"), TypeCode::Pointer).with_target(target)
    }

    #[must_use]
    pub fn reference_to(target: &str) -> Self {
        Self::new(format!("{target} &"), TypeCode::Reference).with_target(target)
    }

    #[must_use]
    pub fn const_of(target: &str) -> Self {
        Self::new(format!("const {target}"), TypeCode::Const).with_target(target)
    }

    #[must_use]
    pub fn typedef(name: impl Into<String>, target: &str) -> Self {
        Self::new(name, TypeCode::Typedef).with_target(target)
    }

    #[must_use]
    pub fn with_target(mut self, target: &str) -> Self {
        self.target = Some(target.to_owned());
        self
    }

    #[must_use]
    pub fn with_field(mut self, name: &str, ty: &str) -> Self {
        self.fields.push(Field {
            name: name.to_owned(),
            ty: ty.to_owned(),
            is_base_class: false,
        });
        self
    }

    #[must_use]
    pub fn with_base_class(mut self, ty: &str) -> Self {
        self.fields.push(Field {
            name: ty.to_owned(),
            ty: ty.to_owned(),
            is_base_class: true,
        });
        self
    }

    #[must_use]
    pub fn with_template_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.template_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// The tag name of aggregate types. Scalars, pointers and the various
    /// aliasing types have no tag.
    #[inline]
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        match self.code {
            TypeCode::Struct | TypeCode::Enum | TypeCode::Sequence | TypeCode::Map => {
                Some(&self.name)
            }
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn base_classes(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.is_base_class)
    }

    #[inline]
    #[must_use]
    pub fn template_arg(&self, index: usize) -> Option<&str> {
        self.template_args.get(index).map(String::as_str)
    }
}

impl std::fmt::Display for Type {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
