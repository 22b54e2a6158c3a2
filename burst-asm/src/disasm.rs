//! Textual rendering of decoded instructions.
//!
//! The output grammar is exactly what the assembler parses back in:
//! registers as `r<n>`, immediates as `#<signed decimal>`, memory
//! operands as `[r<n>]` or `[r<n>+<off>]`, branch targets as `0x<hex>`.
//! Words that do not decode render as a `db` line carrying the raw word.

use crate::opcode::Opcode;
use crate::types::{Offset12, RawInstruction, RegisterId};

use core::fmt;

/// Disassemble one instruction word into its canonical text form.
pub fn disassemble(word: RawInstruction) -> String {
    Opcode::from(word).to_string()
}

struct Mem(RegisterId, Offset12);

impl fmt::Display for Mem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.1 == 0 {
            write!(f, "[r{}]", self.0)
        } else {
            write!(f, "[r{}+{}]", self.0, self.1)
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Opcode::*;

        let mnemonic = match self.repr() {
            Some(repr) => repr.mnemonic(),
            None => {
                let Undefined(raw) = self else {
                    unreachable!("only Undefined lacks a repr")
                };

                return write!(f, "db 0x{raw:08x}");
            }
        };

        match *self {
            LOAD(rd, rs1, off) | LOADB(rd, rs1, off) => {
                write!(f, "{mnemonic} r{rd}, {}", Mem(rs1, off))
            }
            STORE(rd, rs1, off) | STOREB(rd, rs1, off) => {
                write!(f, "{mnemonic} r{rd}, {}", Mem(rs1, off))
            }
            PUSH(rd) | POP(rd) | INC(rd) | DEC(rd) | NEG(rd) => {
                write!(f, "{mnemonic} r{rd}")
            }
            ADD(rd, rs1, rs2)
            | SUB(rd, rs1, rs2)
            | MUL(rd, rs1, rs2)
            | DIV(rd, rs1, rs2)
            | MOD(rd, rs1, rs2)
            | AND(rd, rs1, rs2)
            | OR(rd, rs1, rs2)
            | XOR(rd, rs1, rs2)
            | SHL(rd, rs1, rs2)
            | SHR(rd, rs1, rs2) => {
                write!(f, "{mnemonic} r{rd}, r{rs1}, r{rs2}")
            }
            NOT(rd, rs1) | MOV(rd, rs1) => write!(f, "{mnemonic} r{rd}, r{rs1}"),
            MOVI(rd, imm) => write!(f, "{mnemonic} r{rd}, #{}", imm as i16),
            CMP(rs1, rs2) => write!(f, "{mnemonic} r{rs1}, r{rs2}"),
            JMP(addr) | JZ(addr) | JNZ(addr) | JEQ(addr) | JNE(addr) | JLT(addr)
            | JGT(addr) | JLE(addr) | JGE(addr) | CALL(addr) => {
                write!(f, "{mnemonic} 0x{addr:x}")
            }
            RET | SYSCALL | HALT | NOP => write!(f, "{mnemonic}"),
            Undefined(_) => unreachable!("handled above"),
        }
    }
}
