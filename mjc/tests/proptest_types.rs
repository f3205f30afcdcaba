//! Property-based tests for the type model.
//!
//! Arrays are compared by structure, classes by identity.

use mjc::symtab::{TypeId, Types};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Base {
    Int,
    Char,
    /// Index into a list of separately declared classes.
    Class(usize),
}

fn arb_base() -> impl Strategy<Value = Base> {
    prop_oneof![
        Just(Base::Int),
        Just(Base::Char),
        (0..2_usize).prop_map(Base::Class),
    ]
}

/// Build `base` wrapped in `depth` fresh array types.
fn build(types: &mut Types, classes: &[TypeId], base: Base, depth: usize) -> TypeId {
    let mut ty = match base {
        Base::Int => Types::INT,
        Base::Char => Types::CHAR,
        Base::Class(i) => classes[i],
    };
    for _ in 0..depth {
        ty = types.new_array(ty);
    }
    ty
}

fn same_base(a: Base, b: Base) -> bool {
    match (a, b) {
        (Base::Int, Base::Int) | (Base::Char, Base::Char) => true,
        (Base::Class(x), Base::Class(y)) => x == y,
        _ => false,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Separately built array types are equal exactly when they have the
    /// same nesting depth over the same element type.
    #[test]
    fn nested_arrays_equal_by_structure(
        a in arb_base(),
        da in 0..4_usize,
        b in arb_base(),
        db in 0..4_usize,
    ) {
        let mut types = Types::new();
        let classes = [types.new_class(), types.new_class()];
        let x = build(&mut types, &classes, a, da);
        let y = build(&mut types, &classes, b, db);

        let expected = da == db && same_base(a, b);
        prop_assert_eq!(types.equals(x, y), expected);
        prop_assert_eq!(types.equals(y, x), expected);
        prop_assert_eq!(types.compatible_with(x, y), expected);
    }

    /// `null` goes into any reference type and nothing else.
    #[test]
    fn null_assignable_to_references(base in arb_base(), depth in 0..3_usize) {
        let mut types = Types::new();
        let classes = [types.new_class(), types.new_class()];
        let ty = build(&mut types, &classes, base, depth);

        let is_ref = depth > 0 || matches!(base, Base::Class(_));
        prop_assert_eq!(types.assignable_to(Types::NULL, ty), is_ref);
        prop_assert_eq!(types.compatible_with(ty, Types::NULL), is_ref);
    }
}
