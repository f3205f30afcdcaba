//! Expressions, designators and calls.
use super::Parser;
use crate::{
    codegen::{OpCode, Operand, OperandKind},
    diagnostics::Message,
    lex::{Keyword as KW, TokenKind as TK},
    symtab::{ObjId, ObjKind, TypeId, Types},
};

impl<'a> Parser<'a> {
    /// `[-] Term {Addop Term}`
    pub(super) fn expr(&mut self) -> Operand {
        match self.nested(Self::sum) {
            Some(x) => x,
            None => {
                self.skip_nested_expr();
                Operand::none()
            }
        }
    }

    fn sum(&mut self) -> Operand {
        let mut x = if self.sym() == TK::Minus {
            self.scan();
            let mut x = self.term();
            if x.ty != Types::INT {
                self.error(Message::NoIntOp);
            }
            if x.kind == OperandKind::Con {
                x.val = x.val.wrapping_neg();
            } else {
                self.load_value(&mut x);
                self.code.put(OpCode::Neg);
            }
            x
        } else {
            self.term()
        };

        while let Some(op) = self.addop() {
            self.load_value(&mut x);
            self.scan();
            let mut y = self.term();
            if x.ty != Types::INT || y.ty != Types::INT {
                self.error(Message::NoIntOp);
            }
            self.load_value(&mut y);
            self.code.put(op);
        }

        x
    }

    /// `Factor {Mulop Factor}`
    fn term(&mut self) -> Operand {
        let mut x = self.factor();

        while let Some(op) = self.mulop() {
            self.load_value(&mut x);
            self.scan();
            let mut y = self.factor();
            if x.ty != Types::INT || y.ty != Types::INT {
                self.error(Message::NoIntOp);
            }
            self.load_value(&mut y);
            self.code.put(op);
        }

        x
    }

    fn addop(&self) -> Option<OpCode> {
        match self.sym() {
            TK::Plus => Some(OpCode::Add),
            TK::Minus => Some(OpCode::Sub),
            _ => None,
        }
    }

    fn mulop(&self) -> Option<OpCode> {
        match self.sym() {
            TK::Times => Some(OpCode::Mul),
            TK::Slash => Some(OpCode::Div),
            TK::Rem => Some(OpCode::Rem),
            _ => None,
        }
    }

    fn factor(&mut self) -> Operand {
        match self.sym() {
            TK::Ident => {
                let mut x = self.designator();
                if self.sym() == TK::LeftParen {
                    if x.kind != OperandKind::Meth {
                        self.error(Message::NoMeth);
                    }
                    if x.ty == Types::NONE {
                        self.error(Message::InvalidCall);
                    }
                    self.act_pars(&mut x);
                    self.emit_call(&x);
                    x.kind = OperandKind::Stack;
                } else if x.kind == OperandKind::Meth {
                    // A method name is not a value unless it's called.
                    x.kind = OperandKind::None;
                }
                x
            }
            TK::Number => {
                self.scan();
                Operand::con(self.prev().val)
            }
            TK::CharConst => {
                self.scan();
                Operand::char_con(self.prev().val)
            }
            TK::Keyword(KW::New) => self.new_object(),
            TK::LeftParen => {
                self.scan();
                let x = self.expr();
                self.check(TK::RightParen);
                x
            }
            _ => {
                self.error(Message::InvalidFact);
                Operand::none()
            }
        }
    }

    /// `new ident [ [ Expr ] ]`
    fn new_object(&mut self) -> Operand {
        self.check(TK::Keyword(KW::New));
        self.check(TK::Ident);
        let name = self.prev().name.clone();
        let id = self.tab.find(&name, &mut self.reporter);
        let (kind, mut ty) = (self.tab.obj(id).kind, self.tab.obj(id).ty);

        if self.sym() == TK::LeftBracket {
            self.scan();
            if kind != ObjKind::Type {
                self.error(Message::NoType);
            }
            let mut size = self.expr();
            if size.ty != Types::INT {
                self.error(Message::ArraySize);
            }
            self.load_value(&mut size);
            self.code.put(OpCode::NewArray);
            self.code.put_byte(Self::elem_size(ty));
            ty = self.tab.types_mut().new_array(ty);
            self.check(TK::RightBracket);
        } else {
            if kind != ObjKind::Type {
                self.error(Message::NoType);
            }
            if !self.tab.types().is_class(ty) {
                self.error(Message::NoClassType);
            }
            let n_fields = self.tab.types().fields(ty).len();
            self.code.put(OpCode::New);
            self.code.put2(n_fields as i32);
        }

        Operand::stack(ty)
    }

    /// `ident {. ident | [ Expr ]}`
    pub(super) fn designator(&mut self) -> Operand {
        self.check(TK::Ident);
        let name = self.prev().name.clone();
        let id = self.tab.find(&name, &mut self.reporter);
        let mut x = Operand::from_obj(&self.tab, id, &mut self.reporter);

        loop {
            match self.sym() {
                TK::Period => {
                    if !self.tab.types().is_class(x.ty) {
                        self.error(Message::NoClass);
                    }
                    self.scan();
                    self.load_value(&mut x);
                    self.check(TK::Ident);
                    let name = self.prev().name.clone();
                    let field = self.tab.find_field(&name, x.ty, &mut self.reporter);
                    let field = self.tab.obj(field);
                    x.kind = OperandKind::Fld;
                    x.ty = field.ty;
                    x.adr = field.adr;
                }
                TK::LeftBracket => {
                    if !x.is_var() {
                        self.error(Message::NoVal);
                    }
                    self.scan();
                    self.load_value(&mut x);
                    let mut index = self.expr();
                    if index.ty != Types::INT {
                        self.error(Message::ArrayIndex);
                    }
                    self.load_value(&mut index);
                    if !self.tab.types().is_array(x.ty) {
                        self.error(Message::NoArray);
                    }
                    x.kind = OperandKind::Elem;
                    x.ty = self.tab.types().elem_type(x.ty);
                    self.check(TK::RightBracket);
                }
                _ => break,
            }
        }

        x
    }

    // ------------------------------------------------------------------------
    // Calls

    /// Emit the invocation of a method whose arguments are on the
    /// stack, returning the type of the result.
    ///
    /// Built-in methods compile inline.
    pub(super) fn emit_call(&mut self, x: &Operand) -> TypeId {
        match x.obj {
            Some(id) if id == self.tab.chr_obj() || id == self.tab.ord_obj() => {}
            Some(id) if id == self.tab.len_obj() => self.code.put(OpCode::ArrayLength),
            Some(_) => self.code.call(x, &mut self.reporter),
            // Already reported as not a method.
            None => {}
        }
        x.ty
    }

    /// `( [Expr {, Expr}] [# number {, Expr}] )`
    ///
    /// Pushes the arguments of a call to `m`, matching them against
    /// the parameters. Arguments for a vararg parameter are collected
    /// into a new array.
    pub(super) fn act_pars(&mut self, m: &mut Operand) {
        self.check(TK::LeftParen);

        let meth = match (m.kind, m.obj) {
            (OperandKind::Meth, Some(id)) => Some(id),
            _ => {
                self.error(Message::NoMeth);
                m.obj = None;
                None
            }
        };
        let (params, vararg): (Vec<ObjId>, Option<ObjId>) = match meth {
            Some(id) => {
                let obj = self.tab.obj(id);
                let params = obj.params();
                match params.split_last() {
                    Some((&last, fixed)) if obj.has_var_arg => (fixed.to_vec(), Some(last)),
                    _ => (params.to_vec(), None),
                }
            }
            None => (vec![], None),
        };

        let mut n_args = 0;
        if self.sym().starts_expr() {
            loop {
                let mut x = self.expr();
                self.load_value(&mut x);
                if let Some(&par) = params.get(n_args) {
                    let par_ty = self.tab.obj(par).ty;
                    if !self.tab.types().assignable_to(x.ty, par_ty) {
                        self.error(Message::ParamType);
                    }
                }
                n_args += 1;

                if self.sym() == TK::Comma {
                    self.scan();
                } else {
                    break;
                }
            }
        }

        if meth.is_some() {
            if n_args > params.len() {
                self.error(Message::MoreActualParams);
            }
            if n_args < params.len() {
                self.error(Message::LessActualParams);
            }
        }

        let vararg_elem = vararg.map(|par| {
            let par_ty = self.tab.obj(par).ty;
            self.tab.types().elem_type(par_ty)
        });
        if self.sym() == TK::Hash {
            self.var_args(vararg_elem.unwrap_or(Types::NONE));
            if meth.is_some() && vararg_elem.is_none() {
                self.error(Message::InvalidVarargCall);
            }
        } else if let Some(elem) = vararg_elem {
            // No vararg arguments given, pass an empty array.
            self.code.load_const(0);
            self.code.put(OpCode::NewArray);
            self.code.put_byte(Self::elem_size(elem));
        }

        self.check(TK::RightParen);
    }

    /// `# number [Expr {, Expr}]`
    ///
    /// An element type of [`Types::NONE`] is inferred from the first argument.
    fn var_args(&mut self, mut elem: TypeId) {
        self.check(TK::Hash);
        self.check(TK::Number);
        let size = self.prev().val;

        self.code.load_const(size);
        self.code.put(OpCode::NewArray);
        self.code.put_byte(Self::elem_size(elem));

        let mut n_args = 0;
        if self.sym().starts_expr() {
            loop {
                self.code.put(OpCode::Dup);
                self.code.load_const(n_args);
                let mut x = self.expr();
                if elem == Types::NONE {
                    elem = x.ty;
                }
                if !self.tab.types().assignable_to(x.ty, elem) {
                    self.error(Message::ParamType);
                }
                self.load_value(&mut x);
                self.code.put(if elem == Types::CHAR { OpCode::BAStore } else { OpCode::AStore });
                n_args += 1;

                if self.sym() == TK::Comma {
                    self.scan();
                } else {
                    break;
                }
            }
        }

        if n_args > size {
            self.error(Message::MoreActualVarargs);
        }
        if n_args < size {
            self.error(Message::LessActualVarargs);
        }
    }
}
