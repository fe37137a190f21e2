//! Type, field, and method descriptors
//!
//! A `TypeInfo` describes a type for introspection independent of any
//! live instance. Member tables load lazily, at most once, from the
//! class registry; concurrent first readers block on the single load
//! rather than observing a torn table.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use keypath_core::{Access, ClassId, ClassRegistry};

/// What kind of type a descriptor stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// Builtin value or string type
    Primitive,
    /// Registered class
    Object,
    /// Generic container (list/set/map) with an element type
    Container,
    /// Array with a dimension depth and an element type
    Array,
}

/// A field descriptor
#[derive(Debug, Clone)]
pub struct FieldInfo {
    /// Name of the declaring type
    pub declaring: String,
    /// Field name
    pub name: String,
    /// Declared type name
    pub type_name: String,
    /// Accessibility tier
    pub access: Access,
}

/// A method descriptor
#[derive(Debug, Clone)]
pub struct MethodInfo {
    /// Name of the declaring type
    pub declaring: String,
    /// Method name
    pub name: String,
    /// Ordered parameter type names (empty allowed)
    pub param_types: Vec<String>,
    /// Declared return type name
    pub return_type: String,
    /// Accessibility tier
    pub access: Access,
    /// True for class-level methods
    pub is_static: bool,
    munged: String,
}

impl MethodInfo {
    /// Build a descriptor; the munged name is computed here, a pure
    /// function of (name, ordered parameter type names)
    pub fn new(
        declaring: impl Into<String>,
        name: impl Into<String>,
        param_types: Vec<String>,
        return_type: impl Into<String>,
        access: Access,
        is_static: bool,
    ) -> Self {
        let name = name.into();
        let munged = format!("{}({})", name, param_types.join(","));
        Self {
            declaring: declaring.into(),
            name,
            param_types,
            return_type: return_type.into(),
            access,
            is_static,
            munged,
        }
    }

    /// The overload-disambiguation key: name plus ordered parameter
    /// type names
    pub fn munged_name(&self) -> &str {
        &self.munged
    }
}

/// Where a descriptor's members come from
enum TypeSource {
    /// No members (primitives, synthesized containers/arrays)
    None,
    /// A registered class; members load from the registry
    Class {
        classes: Arc<ClassRegistry>,
        class_id: ClassId,
    },
}

#[derive(Default)]
struct MemberTables {
    fields: Vec<Arc<FieldInfo>>,
    methods: Vec<Arc<MethodInfo>>,
}

/// A type descriptor
pub struct TypeInfo {
    name: String,
    impl_name: String,
    kind: TypeKind,
    element: Option<Arc<TypeInfo>>,
    dimensions: usize,
    access: Access,
    source: TypeSource,
    members: OnceCell<MemberTables>,
}

impl TypeInfo {
    /// Descriptor for a primitive type
    pub fn primitive(name: impl Into<String>, impl_name: impl Into<String>) -> Arc<TypeInfo> {
        Arc::new(TypeInfo {
            name: name.into(),
            impl_name: impl_name.into(),
            kind: TypeKind::Primitive,
            element: None,
            dimensions: 0,
            access: Access::Public,
            source: TypeSource::None,
            members: OnceCell::new(),
        })
    }

    /// Base descriptor for a container representation (no element yet)
    pub fn container_base(name: impl Into<String>) -> Arc<TypeInfo> {
        let name = name.into();
        Arc::new(TypeInfo {
            impl_name: name.clone(),
            name,
            kind: TypeKind::Container,
            element: None,
            dimensions: 0,
            access: Access::Public,
            source: TypeSource::None,
            members: OnceCell::new(),
        })
    }

    /// Descriptor for a registered class
    pub fn object(classes: Arc<ClassRegistry>, class_id: ClassId) -> Option<Arc<TypeInfo>> {
        let class = classes.get(class_id)?;
        Some(Arc::new(TypeInfo {
            name: class.name.clone(),
            impl_name: class.name.clone(),
            kind: TypeKind::Object,
            element: None,
            dimensions: 0,
            access: class.access,
            source: TypeSource::Class { classes, class_id },
            members: OnceCell::new(),
        }))
    }

    /// Container descriptor wrapping a base representation and an
    /// element type; a bare container keeps the base name, a typed one
    /// renders as `base<element>`
    pub fn container(base: &Arc<TypeInfo>, element: Arc<TypeInfo>) -> Arc<TypeInfo> {
        let name = if element.name() == "any" {
            base.impl_name().to_string()
        } else {
            format!("{}<{}>", base.impl_name(), element.name())
        };
        Arc::new(TypeInfo {
            name,
            impl_name: base.impl_name().to_string(),
            kind: TypeKind::Container,
            element: Some(element),
            dimensions: 0,
            access: Access::Public,
            source: TypeSource::None,
            members: OnceCell::new(),
        })
    }

    /// Array descriptor of `dimensions` depth over an element type
    pub fn array(element: Arc<TypeInfo>, dimensions: usize) -> Arc<TypeInfo> {
        let name = format!("{}{}", "[".repeat(dimensions), element.name());
        Arc::new(TypeInfo {
            name,
            impl_name: "array".to_string(),
            kind: TypeKind::Array,
            element: Some(element),
            dimensions,
            access: Access::Public,
            source: TypeSource::None,
            members: OnceCell::new(),
        })
    }

    /// Canonical name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Underlying representation name
    pub fn impl_name(&self) -> &str {
        &self.impl_name
    }

    /// Kind of this descriptor
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Element type (containers and arrays only)
    pub fn element_type(&self) -> Option<&Arc<TypeInfo>> {
        self.element.as_ref()
    }

    /// Array dimension depth (zero for non-arrays)
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Accessibility tier
    pub fn access(&self) -> Access {
        self.access
    }

    /// Class id, for object descriptors
    pub fn class_id(&self) -> Option<ClassId> {
        match &self.source {
            TypeSource::Class { class_id, .. } => Some(*class_id),
            TypeSource::None => None,
        }
    }

    /// All fields, inherited included, most-derived declarations first
    pub fn fields(&self) -> &[Arc<FieldInfo>] {
        &self.members().fields
    }

    /// All methods, inherited included; overridden signatures appear
    /// once, under their most-derived declaration
    pub fn methods(&self) -> &[Arc<MethodInfo>] {
        &self.members().methods
    }

    /// Field by name
    pub fn field_named(&self, name: &str) -> Option<Arc<FieldInfo>> {
        self.fields().iter().find(|f| f.name == name).cloned()
    }

    /// All overloads of a method name, in table order
    pub fn methods_named(&self, name: &str) -> Vec<Arc<MethodInfo>> {
        self.methods()
            .iter()
            .filter(|m| m.name == name)
            .cloned()
            .collect()
    }

    /// Method by its munged name
    pub fn method_by_munged_name(&self, munged: &str) -> Option<Arc<MethodInfo>> {
        self.methods()
            .iter()
            .find(|m| m.munged_name() == munged)
            .cloned()
    }

    fn members(&self) -> &MemberTables {
        self.members.get_or_init(|| self.load_members())
    }

    fn load_members(&self) -> MemberTables {
        let (classes, class_id) = match &self.source {
            TypeSource::Class { classes, class_id } => (classes, *class_id),
            TypeSource::None => return MemberTables::default(),
        };
        let mut tables = MemberTables::default();
        for class in classes.ancestors(class_id) {
            for field in &class.fields {
                // A more-derived declaration shadows the inherited one.
                if tables.fields.iter().any(|f| f.name == field.name) {
                    continue;
                }
                tables.fields.push(Arc::new(FieldInfo {
                    declaring: class.name.clone(),
                    name: field.name.clone(),
                    type_name: field.type_name.clone(),
                    access: field.access,
                }));
            }
            for method in &class.methods {
                let overridden = tables
                    .methods
                    .iter()
                    .any(|m| m.name == method.name && m.param_types == method.param_types);
                if overridden {
                    continue;
                }
                tables.methods.push(Arc::new(MethodInfo::new(
                    class.name.clone(),
                    method.name.clone(),
                    method.param_types.clone(),
                    method.return_type.clone(),
                    method.access,
                    method.is_static,
                )));
            }
        }
        tables
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("name", &self.name)
            .field("impl_name", &self.impl_name)
            .field("kind", &self.kind)
            .field("dimensions", &self.dimensions)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keypath_core::{ClassDef, NativeFn, Value};

    fn noop() -> NativeFn {
        Arc::new(|_receiver, _args| Ok(Value::Null))
    }

    #[test]
    fn test_munged_name_is_pure() {
        let a = MethodInfo::new("T", "f", vec!["int".into(), "string".into()], "null", Access::Public, false);
        let b = MethodInfo::new("U", "f", vec!["int".into(), "string".into()], "bool", Access::Private, true);
        assert_eq!(a.munged_name(), "f(int,string)");
        assert_eq!(a.munged_name(), b.munged_name());

        let zero = MethodInfo::new("T", "g", vec![], "null", Access::Public, false);
        assert_eq!(zero.munged_name(), "g()");
    }

    #[test]
    fn test_member_tables_include_inherited() {
        let classes = Arc::new(ClassRegistry::new());
        let base = classes
            .register(
                ClassDef::new("Base")
                    .field("a", "int")
                    .method("f", vec!["int"], "int", noop())
                    .build(),
            )
            .unwrap();
        let derived = classes
            .register(
                ClassDef::new("Derived")
                    .parent(base)
                    .field("b", "int")
                    .method("f", vec!["int"], "int", noop())
                    .method("f", vec!["string"], "int", noop())
                    .build(),
            )
            .unwrap();

        let info = TypeInfo::object(classes, derived).unwrap();
        assert_eq!(info.fields().len(), 2);
        assert_eq!(info.field_named("a").unwrap().declaring, "Base");

        // The derived f(int) overrides the base one; f(string) adds an
        // overload.
        let overloads = info.methods_named("f");
        assert_eq!(overloads.len(), 2);
        assert!(overloads.iter().all(|m| m.declaring == "Derived"));
    }

    #[test]
    fn test_array_and_container_names() {
        let int = TypeInfo::primitive("int", "i64");
        let arr = TypeInfo::array(int.clone(), 2);
        assert_eq!(arr.name(), "[[int");
        assert_eq!(arr.dimensions(), 2);
        assert_eq!(arr.element_type().unwrap().name(), "int");

        let list = TypeInfo::container_base("list");
        let typed = TypeInfo::container(&list, int);
        assert_eq!(typed.name(), "list<int>");
        let any = TypeInfo::primitive("any", "any");
        let bare = TypeInfo::container(&list, any);
        assert_eq!(bare.name(), "list");
    }
}
