//! Pass-2 encoders: mnemonics onto [`Opcode`] variants, directives onto
//! bytes. Label references are resolved here against the pass-1 map.

use crate::error::{AssembleError, ErrorKind};
use crate::operand::Operand;
use crate::parser::{Directive, Item, Value};

use burst_asm::{Address24, Offset12, Opcode, RegisterId, Word};

use std::collections::BTreeMap;

pub(crate) type Labels = BTreeMap<String, Word>;

/// Bytes this item will emit; pass 1 and pass 2 must agree on it.
pub(crate) fn item_size(item: &Item) -> u32 {
    match item {
        Item::Instruction { .. } => Opcode::LEN as u32,
        Item::Directive(directive) => match directive {
            Directive::String(bytes) => bytes.len() as u32,
            Directive::Bytes(values) => values.len() as u32,
            Directive::Words(values) => (values.len() * 4) as u32,
            Directive::Space(count) => *count,
        },
    }
}

#[derive(Debug, Clone, Copy)]
enum Arg {
    Reg(RegisterId),
    Imm(i64),
    Mem { reg: RegisterId, offset: Offset12 },
}

fn resolve(operand: &Operand, labels: &Labels, line: usize) -> Result<Arg, AssembleError> {
    match operand {
        Operand::Register(reg) => Ok(Arg::Reg(*reg)),
        Operand::Immediate(value) => Ok(Arg::Imm(*value)),
        Operand::Memory { reg, offset } => Ok(Arg::Mem {
            reg: *reg,
            offset: *offset,
        }),
        Operand::Label(name) => labels
            .get(name)
            .map(|&addr| Arg::Imm(i64::from(addr)))
            .ok_or_else(|| ErrorKind::UndefinedLabel(name.clone()).at(line)),
    }
}

fn target(value: i64, line: usize) -> Result<Address24, AssembleError> {
    if (0..=0x00ff_ffff).contains(&value) {
        Ok(value as Address24)
    } else {
        Err(ErrorKind::ValueOutOfRange(value).at(line))
    }
}

/// Encode one instruction line.
pub(crate) fn encode_instruction(
    mnemonic: &str,
    operands: &[Operand],
    labels: &Labels,
    line: usize,
) -> Result<Opcode, AssembleError> {
    use Arg::*;

    let args = operands
        .iter()
        .map(|operand| resolve(operand, labels, line))
        .collect::<Result<Vec<_>, _>>()?;

    let invalid = || ErrorKind::InvalidOperands(mnemonic.into()).at(line);

    let opcode = match mnemonic {
        "load" | "loadb" | "store" | "storeb" => {
            let &[Reg(rd), Mem { reg, offset }] = args.as_slice() else {
                return Err(invalid());
            };

            match mnemonic {
                "load" => Opcode::LOAD(rd, reg, offset),
                "loadb" => Opcode::LOADB(rd, reg, offset),
                "store" => Opcode::STORE(rd, reg, offset),
                _ => Opcode::STOREB(rd, reg, offset),
            }
        }

        "add" | "sub" | "mul" | "div" | "mod" | "and" | "or" | "xor" | "shl" | "shr" => {
            let &[Reg(rd), Reg(rs1), Reg(rs2)] = args.as_slice() else {
                return Err(invalid());
            };

            match mnemonic {
                "add" => Opcode::ADD(rd, rs1, rs2),
                "sub" => Opcode::SUB(rd, rs1, rs2),
                "mul" => Opcode::MUL(rd, rs1, rs2),
                "div" => Opcode::DIV(rd, rs1, rs2),
                "mod" => Opcode::MOD(rd, rs1, rs2),
                "and" => Opcode::AND(rd, rs1, rs2),
                "or" => Opcode::OR(rd, rs1, rs2),
                "xor" => Opcode::XOR(rd, rs1, rs2),
                "shl" => Opcode::SHL(rd, rs1, rs2),
                _ => Opcode::SHR(rd, rs1, rs2),
            }
        }

        "not" | "mov" => {
            let &[Reg(rd), Reg(rs1)] = args.as_slice() else {
                return Err(invalid());
            };

            if mnemonic == "not" {
                Opcode::NOT(rd, rs1)
            } else {
                Opcode::MOV(rd, rs1)
            }
        }

        "cmp" => {
            let &[Reg(rs1), Reg(rs2)] = args.as_slice() else {
                return Err(invalid());
            };

            Opcode::CMP(rs1, rs2)
        }

        "push" | "pop" | "inc" | "dec" | "neg" => {
            let &[Reg(rd)] = args.as_slice() else {
                return Err(invalid());
            };

            match mnemonic {
                "push" => Opcode::PUSH(rd),
                "pop" => Opcode::POP(rd),
                "inc" => Opcode::INC(rd),
                "dec" => Opcode::DEC(rd),
                _ => Opcode::NEG(rd),
            }
        }

        "movi" => {
            let &[Reg(rd), Imm(value)] = args.as_slice() else {
                return Err(invalid());
            };

            if !(-0x8000..=0xffff).contains(&value) {
                return Err(ErrorKind::ValueOutOfRange(value).at(line));
            }

            Opcode::MOVI(rd, value as u16)
        }

        "jmp" | "jz" | "jnz" | "jeq" | "jne" | "jlt" | "jgt" | "jle" | "jge" | "call" => {
            let &[Imm(value)] = args.as_slice() else {
                return Err(invalid());
            };

            let addr = target(value, line)?;

            match mnemonic {
                "jmp" => Opcode::JMP(addr),
                "jz" => Opcode::JZ(addr),
                "jnz" => Opcode::JNZ(addr),
                "jeq" => Opcode::JEQ(addr),
                "jne" => Opcode::JNE(addr),
                "jlt" => Opcode::JLT(addr),
                "jgt" => Opcode::JGT(addr),
                "jle" => Opcode::JLE(addr),
                "jge" => Opcode::JGE(addr),
                _ => Opcode::CALL(addr),
            }
        }

        "ret" | "syscall" | "halt" | "nop" => {
            if !args.is_empty() {
                return Err(invalid());
            }

            match mnemonic {
                "ret" => Opcode::RET,
                "syscall" => Opcode::SYSCALL,
                "halt" => Opcode::HALT,
                _ => Opcode::NOP,
            }
        }

        _ => return Err(ErrorKind::UnknownMnemonic(mnemonic.into()).at(line)),
    };

    Ok(opcode)
}

fn resolve_value(value: &Value, labels: &Labels, line: usize) -> Result<i64, AssembleError> {
    match value {
        Value::Number(number) => Ok(*number),
        Value::Label(name) => labels
            .get(name)
            .map(|&addr| i64::from(addr))
            .ok_or_else(|| ErrorKind::UndefinedLabel(name.clone()).at(line)),
    }
}

/// Emit one directive's bytes.
pub(crate) fn emit_directive(
    directive: &Directive,
    labels: &Labels,
    line: usize,
    out: &mut Vec<u8>,
) -> Result<(), AssembleError> {
    match directive {
        Directive::String(bytes) => out.extend_from_slice(bytes),

        Directive::Bytes(values) => {
            for value in values {
                let value = resolve_value(value, labels, line)?;

                if !(-128..=255).contains(&value) {
                    return Err(ErrorKind::ValueOutOfRange(value).at(line));
                }

                out.push(value as u8);
            }
        }

        Directive::Words(values) => {
            for value in values {
                let value = resolve_value(value, labels, line)?;

                if !(i64::from(i32::MIN)..=i64::from(u32::MAX)).contains(&value) {
                    return Err(ErrorKind::ValueOutOfRange(value).at(line));
                }

                out.extend_from_slice(&(value as u32).to_le_bytes());
            }
        }

        Directive::Space(count) => {
            out.resize(out.len() + *count as usize, 0);
        }
    }

    Ok(())
}
