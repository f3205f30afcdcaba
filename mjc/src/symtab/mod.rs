//! Symbol table.
mod obj;
mod scope;
mod types;

pub use self::{
    obj::{Obj, ObjId, ObjKind},
    scope::Scope,
    types::{Struct, TypeId, TypeKind, Types},
};

use crate::diagnostics::{Message, Report};

/// Scoped symbol table, owning every declared entity
/// and type descriptor of one compilation.
pub struct SymTab {
    types: Types,
    objs: Vec<Obj>,
    /// Open scopes, innermost last. The first one is the
    /// universe holding the predeclared names.
    scopes: Vec<Scope>,
    /// Stand-in returned when a lookup fails.
    no_obj: ObjId,
    chr_obj: ObjId,
    ord_obj: ObjId,
    len_obj: ObjId,
}

impl SymTab {
    pub fn new() -> Self {
        let mut tab = Self {
            types: Types::new(),
            objs: vec![],
            scopes: vec![],
            no_obj: ObjId(0),
            chr_obj: ObjId(0),
            ord_obj: ObjId(0),
            len_obj: ObjId(0),
        };

        // Not inserted into any scope, so it can never be found by name.
        tab.no_obj = tab.push(Obj::new(ObjKind::Var, "$none", Types::INT));

        // Universe. Declarations here can't clash, so errors are discarded.
        let mut ignore = vec![];
        tab.open_scope();
        tab.insert(ObjKind::Type, "int", Types::INT, &mut ignore);
        tab.insert(ObjKind::Type, "char", Types::CHAR, &mut ignore);
        tab.insert(ObjKind::Con, "null", Types::NULL, &mut ignore);

        let open_array = tab.types.new_array(Types::NONE);
        tab.chr_obj = tab.insert_builtin("chr", Types::CHAR, ("i", Types::INT));
        tab.ord_obj = tab.insert_builtin("ord", Types::INT, ("ch", Types::CHAR));
        tab.len_obj = tab.insert_builtin("len", Types::INT, ("arr", open_array));

        debug_assert!(ignore.is_empty());
        tab
    }

    /// Declare a method taking a single parameter.
    fn insert_builtin(&mut self, name: &str, ty: TypeId, param: (&str, TypeId)) -> ObjId {
        let mut ignore = vec![];
        let meth = self.insert(ObjKind::Meth, name, ty, &mut ignore);
        self.open_scope();
        self.insert(ObjKind::Var, param.0, param.1, &mut ignore);
        let locals = self.close_scope();

        let obj = self.obj_mut(meth);
        obj.locals = locals;
        obj.n_pars = 1;
        meth
    }

    fn push(&mut self, obj: Obj) -> ObjId {
        let id = ObjId(self.objs.len() as u32);
        self.objs.push(obj);
        id
    }

    #[inline]
    pub fn types(&self) -> &Types {
        &self.types
    }

    #[inline]
    pub fn types_mut(&mut self) -> &mut Types {
        &mut self.types
    }

    #[inline]
    pub fn obj(&self, id: ObjId) -> &Obj {
        &self.objs[id.0 as usize]
    }

    #[inline]
    pub fn obj_mut(&mut self, id: ObjId) -> &mut Obj {
        &mut self.objs[id.0 as usize]
    }

    #[inline]
    pub fn no_obj(&self) -> ObjId {
        self.no_obj
    }

    #[inline]
    pub fn chr_obj(&self) -> ObjId {
        self.chr_obj
    }

    #[inline]
    pub fn ord_obj(&self) -> ObjId {
        self.ord_obj
    }

    #[inline]
    pub fn len_obj(&self) -> ObjId {
        self.len_obj
    }

    /// Nesting level of the current scope.
    ///
    /// The universe and the program scope are both global (level 0).
    #[inline]
    pub fn level(&self) -> usize {
        self.scopes.len().saturating_sub(2)
    }

    /// Innermost open scope.
    ///
    /// # Panics
    ///
    /// Panics when no scope is open.
    pub fn cur_scope(&self) -> &Scope {
        match self.scopes.last() {
            Some(scope) => scope,
            None => panic!("symbol table has no open scope"),
        }
    }

    pub fn open_scope(&mut self) {
        self.scopes.push(Scope::new());
    }

    /// Close the innermost scope, returning its declarations in order.
    ///
    /// # Panics
    ///
    /// Panics when closing more scopes than were opened.
    pub fn close_scope(&mut self) -> Vec<ObjId> {
        match self.scopes.pop() {
            Some(scope) => scope.into_locals(),
            None => panic!("closed more scopes than were opened"),
        }
    }

    /// Declare a new entity in the current scope.
    ///
    /// A name already declared in the same scope is reported, but the
    /// new entity is inserted anyway and shadows the old one.
    ///
    /// An empty name, left behind by a syntax error, gets an entity
    /// that isn't entered into any scope.
    pub fn insert(&mut self, kind: ObjKind, name: &str, ty: TypeId, errs: &mut dyn Report) -> ObjId {
        if name.is_empty() {
            return self.push(Obj::new(kind, name, ty));
        }

        if self.find_local(name).is_some() {
            errs.report(Message::DeclName(name.into()));
        }

        let mut obj = Obj::new(kind, name, ty);
        if kind == ObjKind::Var {
            obj.adr = self.cur_scope().n_vars() as i32;
            obj.level = self.level();
        }

        let id = self.push(obj);
        match self.scopes.last_mut() {
            Some(scope) => scope.insert(id, kind == ObjKind::Var),
            None => panic!("symbol table has no open scope"),
        }
        id
    }

    /// Most recent declaration of the name in the current scope only.
    pub fn find_local(&self, name: &str) -> Option<ObjId> {
        self.scopes.last().and_then(|scope| self.search(scope.locals(), name))
    }

    /// Search the scopes from the innermost outwards without
    /// reporting anything.
    pub fn lookup(&self, name: &str) -> Option<ObjId> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| self.search(scope.locals(), name))
    }

    fn search(&self, objs: &[ObjId], name: &str) -> Option<ObjId> {
        objs.iter().rev().copied().find(|id| self.obj(*id).name == name)
    }

    /// Resolve a name, reporting it when it isn't declared anywhere.
    pub fn find(&self, name: &str, errs: &mut dyn Report) -> ObjId {
        match self.lookup(name) {
            Some(id) => id,
            None => {
                errs.report(Message::NotFound(name.into()));
                self.no_obj
            }
        }
    }

    /// Resolve a name that must be a method.
    pub fn find_method(&self, name: &str, errs: &mut dyn Report) -> ObjId {
        match self.lookup(name) {
            Some(id) if self.obj(id).kind == ObjKind::Meth => id,
            _ => {
                errs.report(Message::MethNotFound(name.into()));
                self.no_obj
            }
        }
    }

    /// Resolve a field of a class type.
    pub fn find_field(&self, name: &str, ty: TypeId, errs: &mut dyn Report) -> ObjId {
        match self.search(self.types.fields(ty), name) {
            Some(id) => id,
            None => {
                errs.report(Message::NoField(name.into()));
                self.no_obj
            }
        }
    }

    /// Whether the name is declared as a type.
    pub fn is_type_name(&self, name: &str) -> bool {
        self.lookup(name)
            .map(|id| self.obj(id).kind == ObjKind::Type)
            .unwrap_or(false)
    }
}

impl Default for SymTab {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_predeclared_names() {
        let tab = SymTab::new();
        let mut errs = vec![];

        let int = tab.find("int", &mut errs);
        assert_eq!(tab.obj(int).kind, ObjKind::Type);
        assert_eq!(tab.obj(int).ty, Types::INT);
        assert_eq!(tab.obj(tab.find("null", &mut errs)).ty, Types::NULL);

        let len = tab.find_method("len", &mut errs);
        assert_eq!(len, tab.len_obj());
        let param = tab.obj(len).params()[0];
        assert!(tab.types().is_array(tab.obj(param).ty));
        assert_eq!(tab.types().elem_type(tab.obj(param).ty), Types::NONE);

        assert_eq!(tab.obj(tab.chr_obj()).ty, Types::CHAR);
        assert_eq!(tab.obj(tab.ord_obj()).n_pars, 1);
        assert!(errs.is_empty());
    }

    #[test]
    fn test_variable_addresses_are_per_scope() {
        let mut tab = SymTab::new();
        let mut errs = vec![];

        tab.open_scope();
        let a = tab.insert(ObjKind::Var, "a", Types::INT, &mut errs);
        tab.insert(ObjKind::Con, "k", Types::INT, &mut errs);
        let b = tab.insert(ObjKind::Var, "b", Types::CHAR, &mut errs);
        assert_eq!((tab.obj(a).adr, tab.obj(b).adr), (0, 1));
        assert_eq!(tab.obj(a).level, 0);

        tab.open_scope();
        let c = tab.insert(ObjKind::Var, "c", Types::INT, &mut errs);
        assert_eq!(tab.obj(c).adr, 0);
        assert_eq!(tab.obj(c).level, 1);
        assert_eq!(tab.cur_scope().n_vars(), 1);

        assert_eq!(tab.close_scope(), vec![c]);
        assert_eq!(tab.close_scope().len(), 3);
        assert!(errs.is_empty());
    }

    #[test]
    fn test_duplicate_is_reported_and_shadows() {
        let mut tab = SymTab::new();
        let mut errs = vec![];

        tab.open_scope();
        tab.insert(ObjKind::Var, "x", Types::INT, &mut errs);
        let second = tab.insert(ObjKind::Var, "x", Types::CHAR, &mut errs);

        assert_eq!(errs, vec![Message::DeclName("x".into())]);
        assert_eq!(tab.find("x", &mut errs), second);
        assert_eq!(errs.len(), 1);
    }

    #[test]
    fn test_inner_scope_may_shadow_outer() {
        let mut tab = SymTab::new();
        let mut errs = vec![];

        tab.open_scope();
        let outer = tab.insert(ObjKind::Var, "x", Types::INT, &mut errs);
        tab.open_scope();
        let inner = tab.insert(ObjKind::Var, "x", Types::INT, &mut errs);
        assert!(errs.is_empty());
        assert_eq!(tab.find("x", &mut errs), inner);
        tab.close_scope();
        assert_eq!(tab.find("x", &mut errs), outer);
    }

    #[test]
    fn test_lookup_failures() {
        let mut tab = SymTab::new();
        let mut errs = vec![];

        assert_eq!(tab.find("nope", &mut errs), tab.no_obj());
        assert_eq!(tab.find_method("int", &mut errs), tab.no_obj());
        let anon = tab.insert(ObjKind::Var, "", Types::INT, &mut errs);
        assert_ne!(anon, tab.no_obj());
        assert_eq!(tab.lookup(""), None);
        assert_eq!(
            errs,
            vec![Message::NotFound("nope".into()), Message::MethNotFound("int".into())]
        );
    }

    #[test]
    fn test_find_field() {
        let mut tab = SymTab::new();
        let mut errs = vec![];

        tab.open_scope();
        let class = tab.types_mut().new_class();
        tab.open_scope();
        let f = tab.insert(ObjKind::Var, "f", Types::INT, &mut errs);
        let fields = tab.close_scope();
        tab.types_mut().set_fields(class, fields);

        assert_eq!(tab.find_field("f", class, &mut errs), f);
        assert_eq!(tab.find_field("g", class, &mut errs), tab.no_obj());
        assert_eq!(errs, vec![Message::NoField("g".into())]);
    }

    #[test]
    #[should_panic]
    fn test_unmatched_close_panics() {
        let mut tab = SymTab::new();
        tab.close_scope();
        tab.close_scope();
    }
}
