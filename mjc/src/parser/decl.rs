//! Declarations.
use log::debug;

use super::Parser;
use crate::{
    diagnostics::Message,
    lex::{Keyword as KW, TokenKind as TK},
    symtab::{ObjId, ObjKind, TypeId, Types},
};

impl<'a> Parser<'a> {
    /// `final Type ident = (number | charConst) ;`
    pub(super) fn const_decl(&mut self) {
        self.check(TK::Keyword(KW::Final));
        let ty = self.type_();
        self.check(TK::Ident);
        let name = self.prev().name.clone();
        let con = self.tab.insert(ObjKind::Con, &name, ty, &mut self.reporter);
        self.check(TK::Assign);

        let literal_ty = match self.sym() {
            TK::Number => Some(Types::INT),
            TK::CharConst => Some(Types::CHAR),
            _ => None,
        };
        match literal_ty {
            Some(literal_ty) if literal_ty == ty => {
                self.scan();
                self.tab.obj_mut(con).val = self.stream.previous_token().val;
            }
            Some(_) => self.error(Message::ConstType),
            None => self.error(Message::ConstDecl),
        }

        self.check(TK::Semicolon);
    }

    /// `Type ident {, ident} ;`
    pub(super) fn var_decl(&mut self) {
        let ty = self.type_();
        loop {
            if self.sym() == TK::Ident {
                self.scan();
                let name = self.prev().name.clone();
                self.tab.insert(ObjKind::Var, &name, ty, &mut self.reporter);
            } else {
                self.error(Message::TokenExpected(TK::Ident));
            }

            if self.sym() == TK::Comma {
                self.scan();
            } else {
                break;
            }
        }
        self.check(TK::Semicolon);
    }

    /// `class ident { {VarDecl} }`
    pub(super) fn class_decl(&mut self) {
        self.check(TK::Keyword(KW::Class));
        self.check(TK::Ident);
        let name = self.prev().name.clone();
        let ty = self.tab.types_mut().new_class();
        self.tab.insert(ObjKind::Type, &name, ty, &mut self.reporter);
        self.check(TK::LeftBrace);

        let ((), fields) = self.scoped(|p| {
            while p.sym() == TK::Ident {
                p.var_decl();
            }
            if p.tab.cur_scope().n_vars() > p.conf.max_fields {
                p.error(Message::TooManyFields);
            }
        });
        self.tab.types_mut().set_fields(ty, fields);

        self.check(TK::RightBrace);
    }

    /// `(Type | void) ident ( [FormPars] ) {VarDecl} Block`
    pub(super) fn method_decl(&mut self) {
        if self.sym() != TK::Ident && self.sym() != TK::Keyword(KW::Void) {
            self.error(Message::MethDecl);
            self.recover_meth_decl();
        }
        if self.sym() == TK::EOF {
            return;
        }

        let ty = if self.sym() == TK::Ident {
            self.type_()
        } else {
            self.scan();
            Types::NONE
        };

        self.check(TK::Ident);
        let name = self.prev().name.clone();
        let meth = self.tab.insert(ObjKind::Meth, &name, ty, &mut self.reporter);
        let adr = self.code.pc();
        self.tab.obj_mut(meth).adr = adr as i32;
        self.cur_meth = Some(meth);
        debug!("method {} at {}", name, adr);

        self.check(TK::LeftParen);
        let ((), locals) = self.scoped(|p| {
            if p.sym() == TK::Ident {
                let n_pars = p.form_pars(meth);
                p.tab.obj_mut(meth).n_pars = n_pars;
            }
            // Parameters must be known to calls in the body, including recursive ones.
            let params = p.tab.cur_scope().locals().to_vec();
            p.tab.obj_mut(meth).locals = params;
            p.check(TK::RightParen);

            while p.sym() == TK::Ident {
                p.var_decl();
            }

            let n_pars = p.tab.obj(meth).n_pars;
            let n_vars = p.tab.cur_scope().n_vars();
            if n_vars > p.conf.max_locals {
                p.error(Message::TooManyLocals);
            }

            if name == "main" {
                if ty != Types::NONE {
                    p.error(Message::MainNotVoid);
                }
                if n_pars != 0 {
                    p.error(Message::MainWithParams);
                }
                p.code.set_main_pc(adr);
                debug!("entry point at {}", adr);
            }

            p.code.enter(n_pars, n_vars);
            p.block();
            p.code.return_(ty);

            if p.code.take_far_jumps() > 0 {
                p.error(Message::JumpTooFar);
            }
        });

        self.tab.obj_mut(meth).locals = locals;
        self.cur_meth = None;
    }

    /// `Type ident {, Type ident} [...]`
    ///
    /// A trailing ellipsis turns the last parameter into an array
    /// that takes the remaining arguments of a call.
    fn form_pars(&mut self, meth: ObjId) -> usize {
        let mut n_pars = 0;
        let last = loop {
            let ty = self.type_();
            self.check(TK::Ident);
            let name = self.prev().name.clone();
            let par = self.tab.insert(ObjKind::Var, &name, ty, &mut self.reporter);
            n_pars += 1;

            if self.sym() == TK::Comma {
                self.scan();
            } else {
                break par;
            }
        };

        if self.sym() == TK::PPPeriod {
            self.scan();
            let elem = self.tab.obj(last).ty;
            let ty = self.tab.types_mut().new_array(elem);
            self.tab.obj_mut(last).ty = ty;
            self.tab.obj_mut(meth).has_var_arg = true;
        }

        n_pars
    }

    /// `ident [ [ ] ]`
    pub(super) fn type_(&mut self) -> TypeId {
        self.check(TK::Ident);
        let name = self.prev().name.clone();
        let id = self.tab.find(&name, &mut self.reporter);
        let (kind, obj_ty) = (self.tab.obj(id).kind, self.tab.obj(id).ty);

        let mut ty = if kind == ObjKind::Type {
            obj_ty
        } else {
            self.error(Message::NoType);
            Types::NONE
        };

        if self.sym() == TK::LeftBracket {
            self.scan();
            self.check(TK::RightBracket);
            ty = self.tab.types_mut().new_array(ty);
        }

        ty
    }
}
