//! Small stack machine that runs compiled code, so tests can check
//! what a program does rather than which bytes it compiles to.
#![allow(dead_code)]

use std::collections::HashMap;

use mjc::{
    codegen::{Code, OpCode},
    disasm::{decode, Instr},
};

/// Upper bound on executed instructions, so broken jumps fail instead of hanging.
const STEP_LIMIT: usize = 100_000;

#[derive(Debug, PartialEq, Eq)]
pub enum Fault {
    NoEntry,
    BadAddress(usize),
    StackUnderflow,
    NullReference,
    IndexOutOfBounds,
    DivideByZero,
    Trap(i32),
    StepLimit,
    Unsupported(OpCode),
}

pub struct Machine {
    instrs: Vec<Instr>,
    index: HashMap<usize, usize>,
    pub globals: Vec<i32>,
    /// Objects and arrays. References are indices plus one, so zero is null.
    pub heap: Vec<Vec<i32>>,
    stack: Vec<i32>,
    locals: Vec<i32>,
    frames: Vec<usize>,
    returns: Vec<usize>,
    pub output: String,
}

impl Machine {
    pub fn new(code: &Code) -> Self {
        let instrs = decode(code.buf());
        let index = instrs
            .iter()
            .enumerate()
            .map(|(i, instr)| (instr.addr, i))
            .collect();
        Self {
            instrs,
            index,
            globals: vec![0; code.data_size()],
            heap: vec![],
            stack: vec![],
            locals: vec![],
            frames: vec![],
            returns: vec![],
            output: String::new(),
        }
    }

    fn pop(&mut self) -> Result<i32, Fault> {
        self.stack.pop().ok_or(Fault::StackUnderflow)
    }

    fn local(&mut self, n: i32) -> &mut i32 {
        let fp = self.frames.last().copied().unwrap_or(0);
        &mut self.locals[fp + n as usize]
    }

    fn object(&mut self, reference: i32) -> Result<&mut Vec<i32>, Fault> {
        if reference == 0 {
            return Err(Fault::NullReference);
        }
        self.heap
            .get_mut(reference as usize - 1)
            .ok_or(Fault::NullReference)
    }

    fn alloc(&mut self, size: usize) -> i32 {
        self.heap.push(vec![0; size]);
        self.heap.len() as i32
    }

    fn print(&mut self, text: String, width: i32) {
        let width = width.max(0) as usize;
        self.output.push_str(&format!("{text:>width$}"));
    }

    /// Run from the entry point until the main method returns.
    pub fn run(&mut self, entry: Option<usize>) -> Result<(), Fault> {
        use OpCode as O;

        let mut pc = entry.ok_or(Fault::NoEntry)?;
        for _ in 0..STEP_LIMIT {
            let i = *self.index.get(&pc).ok_or(Fault::BadAddress(pc))?;
            let instr = self.instrs[i].clone();
            let op = instr.op.ok_or(Fault::BadAddress(pc))?;
            let args = instr.operands();
            let mut next = pc + instr.len();

            match op {
                O::Load => {
                    let v = *self.local(args[0]);
                    self.stack.push(v);
                }
                O::Load0 | O::Load1 | O::Load2 | O::Load3 => {
                    let v = *self.local(op as i32 - O::Load0 as i32);
                    self.stack.push(v);
                }
                O::Store => {
                    let v = self.pop()?;
                    *self.local(args[0]) = v;
                }
                O::Store0 | O::Store1 | O::Store2 | O::Store3 => {
                    let v = self.pop()?;
                    *self.local(op as i32 - O::Store0 as i32) = v;
                }
                O::GetStatic => self.stack.push(self.globals[args[0] as usize]),
                O::PutStatic => {
                    let v = self.pop()?;
                    self.globals[args[0] as usize] = v;
                }
                O::GetField => {
                    let obj = self.pop()?;
                    let v = *self
                        .object(obj)?
                        .get(args[0] as usize)
                        .ok_or(Fault::IndexOutOfBounds)?;
                    self.stack.push(v);
                }
                O::PutField => {
                    let v = self.pop()?;
                    let obj = self.pop()?;
                    *self
                        .object(obj)?
                        .get_mut(args[0] as usize)
                        .ok_or(Fault::IndexOutOfBounds)? = v;
                }
                O::Const0 | O::Const1 | O::Const2 | O::Const3 | O::Const4 | O::Const5 => {
                    self.stack.push(op as i32 - O::Const0 as i32)
                }
                O::ConstM1 => self.stack.push(-1),
                O::Const => self.stack.push(args[0]),
                O::Add | O::Sub | O::Mul | O::Div | O::Rem => {
                    let b = self.pop()?;
                    let a = self.pop()?;
                    let v = match op {
                        O::Add => a.wrapping_add(b),
                        O::Sub => a.wrapping_sub(b),
                        O::Mul => a.wrapping_mul(b),
                        O::Div => a.checked_div(b).ok_or(Fault::DivideByZero)?,
                        _ => a.checked_rem(b).ok_or(Fault::DivideByZero)?,
                    };
                    self.stack.push(v);
                }
                O::Neg => {
                    let a = self.pop()?;
                    self.stack.push(a.wrapping_neg());
                }
                O::Inc => *self.local(args[0]) += args[1],
                O::New => {
                    let obj = self.alloc(args[0] as usize);
                    self.stack.push(obj);
                }
                O::NewArray => {
                    let len = self.pop()?;
                    let arr = self.alloc(len.max(0) as usize);
                    self.stack.push(arr);
                }
                O::ALoad | O::BALoad => {
                    let idx = self.pop()?;
                    let arr = self.pop()?;
                    let v = *self
                        .object(arr)?
                        .get(idx as usize)
                        .ok_or(Fault::IndexOutOfBounds)?;
                    self.stack.push(v);
                }
                O::AStore | O::BAStore => {
                    let v = self.pop()?;
                    let idx = self.pop()?;
                    let arr = self.pop()?;
                    let v = if op == O::BAStore { v & 0xFF } else { v };
                    *self
                        .object(arr)?
                        .get_mut(idx as usize)
                        .ok_or(Fault::IndexOutOfBounds)? = v;
                }
                O::ArrayLength => {
                    let arr = self.pop()?;
                    let len = self.object(arr)?.len() as i32;
                    self.stack.push(len);
                }
                O::Pop => {
                    self.pop()?;
                }
                O::Dup => {
                    let v = self.pop()?;
                    self.stack.extend([v, v]);
                }
                O::Dup2 => {
                    let b = self.pop()?;
                    let a = self.pop()?;
                    self.stack.extend([a, b, a, b]);
                }
                O::Jmp => next = instr.target().ok_or(Fault::BadAddress(pc))?,
                O::Jeq | O::Jne | O::Jlt | O::Jle | O::Jgt | O::Jge => {
                    let b = self.pop()?;
                    let a = self.pop()?;
                    let taken = match op {
                        O::Jeq => a == b,
                        O::Jne => a != b,
                        O::Jlt => a < b,
                        O::Jle => a <= b,
                        O::Jgt => a > b,
                        _ => a >= b,
                    };
                    if taken {
                        next = instr.target().ok_or(Fault::BadAddress(pc))?;
                    }
                }
                O::Call => {
                    self.returns.push(next);
                    next = instr.target().ok_or(Fault::BadAddress(pc))?;
                }
                O::Return => match self.returns.pop() {
                    Some(ra) => next = ra,
                    None => return Ok(()),
                },
                O::Enter => {
                    let (n_pars, n_vars) = (args[0] as usize, args[1] as usize);
                    let fp = self.locals.len();
                    self.locals.resize(fp + n_vars.max(n_pars), 0);
                    for i in (0..n_pars).rev() {
                        self.locals[fp + i] = self.pop()?;
                    }
                    self.frames.push(fp);
                }
                O::Exit => {
                    let fp = self.frames.pop().ok_or(Fault::StackUnderflow)?;
                    self.locals.truncate(fp);
                }
                O::Print => {
                    let width = self.pop()?;
                    let v = self.pop()?;
                    self.print(v.to_string(), width);
                }
                O::BPrint => {
                    let width = self.pop()?;
                    let v = self.pop()?;
                    let c = char::from_u32(v as u32).unwrap_or('?');
                    self.print(c.to_string(), width);
                }
                O::Trap => return Err(Fault::Trap(args[0])),
                O::Nop => {}
                O::Read | O::BRead | O::Shl | O::Shr => return Err(Fault::Unsupported(op)),
            }

            pc = next;
        }

        Err(Fault::StepLimit)
    }
}

/// Compile and run a program that is expected to be error free,
/// returning what it printed.
pub fn run(source: &str) -> Result<String, Fault> {
    let code = match mjc::compile(source) {
        Ok(code) => code,
        Err(err) => panic!("{err}"),
    };
    let mut machine = Machine::new(&code);
    machine.run(code.main_pc())?;
    Ok(machine.output)
}
