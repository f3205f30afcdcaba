//! Statements and conditions.
use super::Parser;
use crate::{
    codegen::{CompOp, Label, OpCode, Operand, OperandKind},
    diagnostics::{Message, Report},
    lex::{Keyword as KW, TokenKind as TK},
    symtab::Types,
};

impl<'a> Parser<'a> {
    /// `{ {Statement} }`
    pub(super) fn block(&mut self) {
        self.check(TK::LeftBrace);
        while self.sym() != TK::RightBrace && self.sym() != TK::EOF {
            self.statement();
        }
        self.check(TK::RightBrace);
    }

    fn statement(&mut self) {
        if self.nested(Self::single_statement).is_none() {
            self.skip_nested_stat();
        }
    }

    fn single_statement(&mut self) {
        match self.sym() {
            TK::Ident => self.designator_statement(),
            TK::Keyword(KW::If) => self.if_statement(),
            TK::Keyword(KW::While) => self.while_statement(),
            TK::Keyword(KW::Break) => self.break_statement(),
            TK::Keyword(KW::Return) => self.return_statement(),
            TK::Keyword(KW::Read) => self.read_statement(),
            TK::Keyword(KW::Print) => self.print_statement(),
            TK::LeftBrace => self.block(),
            TK::Semicolon => self.scan(),
            _ => {
                self.error(Message::InvalidStat);
                self.recover_stat();
            }
        }
    }

    /// Assignment, call, increment or decrement.
    fn designator_statement(&mut self) {
        let mut x = self.designator();

        match self.sym() {
            TK::Assign => {
                self.scan();
                let mut y = self.expr();
                if !x.is_var() {
                    self.error(Message::NoVar);
                }
                if y.is_valueless() {
                    self.error(Message::NoVal);
                }
                if !self.tab.types().assignable_to(y.ty, x.ty) {
                    self.error(Message::IncompTypes);
                }
                self.code.assign(&x, &mut y, &mut self.reporter);
            }
            TK::PlusAssign | TK::MinusAssign | TK::TimesAssign | TK::SlashAssign | TK::RemAssign => {
                let op = match self.sym() {
                    TK::PlusAssign => OpCode::Add,
                    TK::MinusAssign => OpCode::Sub,
                    TK::TimesAssign => OpCode::Mul,
                    TK::SlashAssign => OpCode::Div,
                    _ => OpCode::Rem,
                };
                self.scan();

                // Keep the address for the store.
                match x.kind {
                    OperandKind::Fld => self.code.put(OpCode::Dup),
                    OperandKind::Elem => self.code.put(OpCode::Dup2),
                    OperandKind::Local | OperandKind::Static => {}
                    _ => self.error(Message::NoVar),
                }
                self.code.load_and_keep(&x, &mut self.reporter);

                let mut y = self.expr();
                if y.is_valueless() {
                    self.error(Message::NoVal);
                }
                if x.ty != Types::INT || y.ty != Types::INT {
                    self.error(Message::NoIntOp);
                }
                self.load_value(&mut y);
                self.code.put(op);
                self.code.assign(&x, &mut Operand::stack(Types::INT), &mut self.reporter);
            }
            TK::LeftParen => {
                self.act_pars(&mut x);
                let ty = self.emit_call(&x);
                // Discard the unused result.
                if ty != Types::NONE {
                    self.code.put(OpCode::Pop);
                }
            }
            TK::PlusPlus => {
                self.code.inc_dec(&x, true, &mut self.reporter);
                self.scan();
            }
            TK::MinusMinus => {
                self.code.inc_dec(&x, false, &mut self.reporter);
                self.scan();
            }
            _ => self.error(Message::DesignFollow),
        }

        self.check(TK::Semicolon);
    }

    fn if_statement(&mut self) {
        self.scan();
        self.check(TK::LeftParen);
        let mut cond = self.condition();
        self.code.f_jump(&mut cond);
        cond.t_label.here(&mut self.code);
        self.check(TK::RightParen);
        self.statement();

        if self.sym() == TK::Keyword(KW::Else) {
            let mut end = Label::new();
            self.code.jump(&mut end);
            cond.f_label.here(&mut self.code);
            self.scan();
            self.statement();
            end.here(&mut self.code);
        } else {
            cond.f_label.here(&mut self.code);
        }
    }

    fn while_statement(&mut self) {
        self.scan();
        self.check(TK::LeftParen);
        let mut top = Label::new();
        top.here(&mut self.code);
        let mut cond = self.condition();
        self.code.f_jump(&mut cond);
        cond.t_label.here(&mut self.code);
        self.check(TK::RightParen);

        let mut exit = self.in_loop(|p| p.statement());
        self.code.jump(&mut top);
        exit.here(&mut self.code);
        cond.f_label.here(&mut self.code);
    }

    fn break_statement(&mut self) {
        self.scan();
        match self.loop_exits.last_mut() {
            Some(exit) => self.code.jump(exit),
            None => self.reporter.report(Message::NoLoop),
        }
        self.check(TK::Semicolon);
    }

    fn return_statement(&mut self) {
        self.scan();
        let meth_ty = match self.cur_meth {
            Some(meth) => self.tab.obj(meth).ty,
            None => Types::NONE,
        };

        if self.sym().starts_expr() {
            if meth_ty == Types::NONE {
                self.error(Message::ReturnVoid);
            }
            let mut x = self.expr();
            self.load_value(&mut x);
            if !self.tab.types().assignable_to(x.ty, meth_ty) {
                self.error(Message::ReturnType);
            }
        } else if meth_ty != Types::NONE {
            self.error(Message::ReturnNoVal);
        }

        self.code.put(OpCode::Exit);
        self.code.put(OpCode::Return);
        self.check(TK::Semicolon);
    }

    fn read_statement(&mut self) {
        self.scan();
        self.check(TK::LeftParen);
        let x = self.designator();
        if !x.is_var() {
            self.error(Message::NoVar);
        }
        if x.ty != Types::INT && x.ty != Types::CHAR {
            self.error(Message::ReadValue);
        }

        self.code.put(if x.ty == Types::CHAR { OpCode::BRead } else { OpCode::Read });
        self.code.assign(&x, &mut Operand::stack(x.ty), &mut self.reporter);

        self.check(TK::RightParen);
        self.check(TK::Semicolon);
    }

    fn print_statement(&mut self) {
        self.scan();
        self.check(TK::LeftParen);
        let mut x = self.expr();

        let mut width = None;
        if self.sym() == TK::Comma {
            self.scan();
            self.check(TK::Number);
            width = Some(self.prev().val);
        }

        let constant = (x.kind == OperandKind::Con).then_some(x.val);
        self.load_value(&mut x);

        if x.ty == Types::INT {
            let width = width.unwrap_or_else(|| constant.map(digit_count).unwrap_or(1));
            self.code.load_const(width);
            self.code.put(OpCode::Print);
        } else if x.ty == Types::CHAR {
            self.code.load_const(width.unwrap_or(1));
            self.code.put(OpCode::BPrint);
        } else {
            self.error(Message::PrintValue);
        }

        self.check(TK::RightParen);
        self.check(TK::Semicolon);
    }

    // ------------------------------------------------------------------------
    // Conditions
    //
    // A condition compiles to jumps. Each term of a disjunction jumps to
    // the condition's true label as soon as it holds, and each factor of
    // a conjunction jumps to the term's false label as soon as it fails.
    // The last comparison is left for the caller to jump on.

    /// `CondTerm {|| CondTerm}`
    fn condition(&mut self) -> Operand {
        let mut x = Operand::cond(None);
        loop {
            let term = self.cond_term();
            x.op = term.op;
            x.f_label = term.f_label;

            if self.sym() == TK::Or {
                self.code.t_jump(&mut x);
                self.scan();
                x.f_label.here(&mut self.code);
            } else {
                break;
            }
        }
        x
    }

    /// `CondFact {&& CondFact}`
    fn cond_term(&mut self) -> Operand {
        let mut x = Operand::cond(None);
        loop {
            x.op = self.cond_fact();

            if self.sym() == TK::And {
                self.code.f_jump(&mut x);
                self.scan();
            } else {
                break;
            }
        }
        x
    }

    /// `Expr Relop Expr`
    fn cond_fact(&mut self) -> Option<CompOp> {
        let mut x = self.expr();
        self.load_value(&mut x);
        let op = self.relop();
        let mut y = self.expr();
        self.load_value(&mut y);

        let types = self.tab.types();
        let compatible = types.compatible_with(x.ty, y.ty);
        let ordered_refs = types.is_ref_type(x.ty) && !matches!(op, Some(CompOp::Eq | CompOp::Ne) | None);
        if !compatible {
            self.error(Message::IncompTypes);
        }
        if ordered_refs {
            self.error(Message::EqCheck);
        }
        op
    }

    fn relop(&mut self) -> Option<CompOp> {
        let op = match self.sym() {
            TK::Eq => CompOp::Eq,
            TK::NotEq => CompOp::Ne,
            TK::Greater => CompOp::Gt,
            TK::GreaterEq => CompOp::Ge,
            TK::Less => CompOp::Lt,
            TK::LessEq => CompOp::Le,
            _ => {
                self.error(Message::RelOp);
                return None;
            }
        };
        self.scan();
        Some(op)
    }
}

/// Number of decimal digits of the value, ignoring the sign.
fn digit_count(val: i32) -> i32 {
    val.unsigned_abs().checked_ilog10().map_or(1, |log| log as i32 + 1)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        codegen::Code,
        diagnostics::Errors,
        disasm::{decode, Instr},
        lex::Lexer,
    };

    fn parse(source: &str) -> (Code, Errors) {
        Parser::new(Lexer::new(source)).parse_all()
    }

    /// Opcodes of the body of `main`, after `enter`.
    fn main_ops(code: &Code) -> Vec<OpCode> {
        let start = code.main_pc().unwrap();
        decode(&code.buf()[start..])
            .into_iter()
            .skip(1)
            .map(|instr: Instr| instr.op.unwrap())
            .collect()
    }

    #[test]
    fn test_digit_count() {
        assert_eq!(digit_count(0), 1);
        assert_eq!(digit_count(9), 1);
        assert_eq!(digit_count(10), 2);
        assert_eq!(digit_count(-123), 3);
        assert_eq!(digit_count(i32::MIN), 10);
    }

    #[test]
    fn test_print_widths() {
        let (code, errors) = parse(
            "program P int x; { void main() { print(12345); print(x); print('a'); print(x, 7); } }",
        );
        assert!(errors.is_empty(), "{errors}");

        use OpCode as O;
        assert_eq!(
            main_ops(&code),
            vec![
                O::Const, O::Const5, O::Print,
                O::GetStatic, O::Const1, O::Print,
                O::Const, O::Const1, O::BPrint,
                O::GetStatic, O::Const, O::Print,
                O::Exit, O::Return,
            ]
        );
    }

    #[test]
    fn test_read_selects_opcode() {
        let (code, errors) = parse("program P { void main() int i; char c; { read(i); read(c); } }");
        assert!(errors.is_empty(), "{errors}");

        use OpCode as O;
        assert_eq!(
            main_ops(&code),
            vec![O::Read, O::Store0, O::BRead, O::Store1, O::Exit, O::Return]
        );
    }

    #[test]
    fn test_compound_assignment_on_field() {
        let (code, errors) = parse(
            "program P class C { int f; } { void main() C c; { c = new C; c.f += 2; } }",
        );
        assert!(errors.is_empty(), "{errors}");

        use OpCode as O;
        assert_eq!(
            main_ops(&code),
            vec![
                O::New, O::Store0,
                O::Load0, O::Dup, O::GetField, O::Const2, O::Add, O::PutField,
                O::Exit, O::Return,
            ]
        );
    }

    #[test]
    fn test_compound_assignment_needs_ints() {
        let (_, errors) = parse("program P { void main() char c; { c += 1; } }");
        assert_eq!(errors.messages().collect::<Vec<_>>(), vec![&Message::NoIntOp]);
    }

    #[test]
    fn test_break_outside_loop() {
        let (code, errors) = parse("program P { void main() { break; print(1); } }");
        assert_eq!(errors.messages().collect::<Vec<_>>(), vec![&Message::NoLoop]);
        assert!(!main_ops(&code).contains(&OpCode::Jmp));
    }

    #[test]
    fn test_break_jumps_past_loop() {
        let (code, errors) =
            parse("program P { void main() int i; { while (i < 10) { if (i == 5) break; i++; } } }");
        assert!(errors.is_empty(), "{errors}");

        let start = code.main_pc().unwrap();
        let instrs = decode(&code.buf()[start..]);
        let exit = instrs.iter().rev().nth(1).unwrap().addr;
        let jumps: Vec<_> = instrs
            .iter()
            .filter(|instr| instr.op == Some(OpCode::Jmp))
            .collect();

        // The break and the jump back to the condition.
        assert_eq!(jumps.len(), 2);
        assert_eq!(jumps[0].target(), Some(exit));
        assert_eq!(jumps[1].target(), Some(instrs[1].addr));
    }

    #[test]
    fn test_return_checks() {
        let (_, errors) = parse("program P { void f() { return 1; } void main() {} }");
        assert_eq!(errors.messages().next(), Some(&Message::ReturnVoid));

        let (_, errors) = parse("program P { int f() { return; } void main() {} }");
        assert_eq!(errors.messages().collect::<Vec<_>>(), vec![&Message::ReturnNoVal]);

        let (_, errors) = parse("program P { int f() { return 'a'; } void main() {} }");
        assert_eq!(errors.messages().collect::<Vec<_>>(), vec![&Message::ReturnType]);
    }

    #[test]
    fn test_non_void_method_traps_at_end() {
        let (code, errors) = parse("program P { int f() { return 1; } void main() {} }");
        assert!(errors.is_empty(), "{errors}");

        use OpCode as O;
        let ops: Vec<_> = decode(&code.buf()[..code.main_pc().unwrap()])
            .into_iter()
            .map(|instr| instr.op.unwrap())
            .collect();
        assert_eq!(ops, vec![O::Enter, O::Const1, O::Exit, O::Return, O::Trap]);
    }

    #[test]
    fn test_reference_comparison() {
        let (_, errors) = parse(
            "program P class C {} { void main() C a, b; { if (a == null) ; if (a != b) ; if (a < b) ; } }",
        );
        assert_eq!(errors.messages().collect::<Vec<_>>(), vec![&Message::EqCheck]);
    }

    #[test]
    fn test_incompatible_comparison() {
        let (_, errors) = parse("program P { void main() int[] a; { if (a == 1) ; } }");
        assert_eq!(errors.messages().collect::<Vec<_>>(), vec![&Message::IncompTypes]);
    }

    #[test]
    fn test_statement_call_pops_result() {
        let (code, errors) = parse("program P { int f() { return 1; } void g() {} void main() { f(); g(); } }");
        assert!(errors.is_empty(), "{errors}");

        use OpCode as O;
        assert_eq!(main_ops(&code), vec![O::Call, O::Pop, O::Call, O::Exit, O::Return]);
    }
}
