//! Type descriptors.
use super::ObjId;

/// Handle to a type descriptor in [`Types`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    None,
    Int,
    Char,
    Array,
    Class,
}

/// Type descriptor.
#[derive(Debug, Clone)]
pub struct Struct {
    pub kind: TypeKind,
    /// Element type of an array.
    pub elem: Option<TypeId>,
    /// Fields of a class, in declaration order.
    pub fields: Vec<ObjId>,
}

/// Arena owning every type descriptor of one compilation.
///
/// The scalar types and the type of `null` are singletons created
/// up front, and are compared by identity. Array types are created
/// anew for every occurrence, and are compared by structure.
#[derive(Debug, Clone)]
pub struct Types {
    structs: Vec<Struct>,
}

impl Types {
    /// No type. As the element type of an array it marks an open
    /// array parameter that accepts arrays of any element type.
    pub const NONE: TypeId = TypeId(0);
    pub const INT: TypeId = TypeId(1);
    pub const CHAR: TypeId = TypeId(2);
    /// Type of `null`, compatible with every reference type.
    pub const NULL: TypeId = TypeId(3);

    pub fn new() -> Self {
        let scalar = |kind| Struct {
            kind,
            elem: None,
            fields: vec![],
        };

        Self {
            structs: vec![
                scalar(TypeKind::None),
                scalar(TypeKind::Int),
                scalar(TypeKind::Char),
                scalar(TypeKind::Class),
            ],
        }
    }

    fn push(&mut self, ty: Struct) -> TypeId {
        let id = TypeId(self.structs.len() as u32);
        self.structs.push(ty);
        id
    }

    /// Create a new array type with the given element type.
    pub fn new_array(&mut self, elem: TypeId) -> TypeId {
        self.push(Struct {
            kind: TypeKind::Array,
            elem: Some(elem),
            fields: vec![],
        })
    }

    /// Create a new class type. Fields are filled in once
    /// the class body has been declared.
    pub fn new_class(&mut self) -> TypeId {
        self.push(Struct {
            kind: TypeKind::Class,
            elem: None,
            fields: vec![],
        })
    }

    #[inline]
    pub fn get(&self, ty: TypeId) -> &Struct {
        &self.structs[ty.0 as usize]
    }

    #[inline]
    pub fn kind(&self, ty: TypeId) -> TypeKind {
        self.get(ty).kind
    }

    /// Element type of an array, or [`Types::NONE`] for anything else.
    #[inline]
    pub fn elem_type(&self, ty: TypeId) -> TypeId {
        self.get(ty).elem.unwrap_or(Types::NONE)
    }

    #[inline]
    pub fn fields(&self, ty: TypeId) -> &[ObjId] {
        &self.get(ty).fields
    }

    pub fn set_fields(&mut self, ty: TypeId, fields: Vec<ObjId>) {
        self.structs[ty.0 as usize].fields = fields;
    }

    #[inline]
    pub fn is_array(&self, ty: TypeId) -> bool {
        self.kind(ty) == TypeKind::Array
    }

    #[inline]
    pub fn is_class(&self, ty: TypeId) -> bool {
        self.kind(ty) == TypeKind::Class
    }

    /// Arrays and classes are reference types.
    #[inline]
    pub fn is_ref_type(&self, ty: TypeId) -> bool {
        matches!(self.kind(ty), TypeKind::Array | TypeKind::Class)
    }

    /// Arrays are equal when their element types are equal.
    /// Everything else is equal only to itself.
    pub fn equals(&self, a: TypeId, b: TypeId) -> bool {
        if self.is_array(a) && self.is_array(b) {
            self.equals(self.elem_type(a), self.elem_type(b))
        } else {
            a == b
        }
    }

    /// Types that may be compared with each other.
    pub fn compatible_with(&self, a: TypeId, b: TypeId) -> bool {
        self.equals(a, b)
            || (a == Types::NULL && self.is_ref_type(b))
            || (b == Types::NULL && self.is_ref_type(a))
    }

    /// Whether a value of type `src` may be stored in a location of type `dest`.
    pub fn assignable_to(&self, src: TypeId, dest: TypeId) -> bool {
        self.equals(src, dest)
            || (src == Types::NULL && self.is_ref_type(dest))
            || (self.is_array(src) && self.is_array(dest) && self.elem_type(dest) == Types::NONE)
    }
}

impl Default for Types {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_scalars_compare_by_identity() {
        let types = Types::new();
        assert!(types.equals(Types::INT, Types::INT));
        assert!(!types.equals(Types::INT, Types::CHAR));
        assert!(!types.is_ref_type(Types::INT));
        assert!(types.is_ref_type(Types::NULL));
    }

    #[test]
    fn test_classes_compare_by_identity() {
        let mut types = Types::new();
        let a = types.new_class();
        let b = types.new_class();
        assert!(types.equals(a, a));
        assert!(!types.equals(a, b));
        assert!(!types.assignable_to(a, b));
    }

    #[test]
    fn test_nested_arrays_compare_by_structure() {
        let mut types = Types::new();
        let a = types.new_array(Types::INT);
        let a2 = types.new_array(a);
        let b = types.new_array(Types::INT);
        let b2 = types.new_array(b);
        let c = types.new_array(Types::CHAR);
        let c2 = types.new_array(c);

        assert!(types.equals(a2, b2));
        assert!(!types.equals(a2, c2));
        assert!(!types.equals(a, a2));
        assert!(!types.equals(a, Types::INT));
    }

    #[test]
    fn test_null_assignability_is_asymmetric() {
        let mut types = Types::new();
        let class = types.new_class();
        let array = types.new_array(Types::CHAR);

        assert!(types.assignable_to(Types::NULL, class));
        assert!(types.assignable_to(Types::NULL, array));
        assert!(!types.assignable_to(class, Types::NULL));
        assert!(!types.assignable_to(array, Types::NULL));
        assert!(!types.assignable_to(Types::NULL, Types::INT));

        assert!(types.compatible_with(class, Types::NULL));
        assert!(types.compatible_with(Types::NULL, array));
    }

    #[test]
    fn test_open_array_parameter() {
        let mut types = Types::new();
        let open = types.new_array(Types::NONE);
        let ints = types.new_array(Types::INT);
        let chars = types.new_array(Types::CHAR);

        assert!(types.assignable_to(ints, open));
        assert!(types.assignable_to(chars, open));
        assert!(!types.assignable_to(ints, chars));
        assert!(!types.assignable_to(Types::INT, open));
        // Only the destination may be open.
        assert!(!types.assignable_to(open, ints));
    }
}
