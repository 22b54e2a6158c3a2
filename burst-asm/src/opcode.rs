use crate::types::{Address24, Immediate16, Offset12, RawInstruction, RegisterId};

use core::fmt;

use consts::*;

pub mod consts;

/// Decoded instruction representation for the interpreter.
///
/// Every variant carries exactly the operands its encoding defines; the
/// remaining bits of the 24-bit operand field are zero. Instructions are
/// stored as little-endian 32-bit words and the executor advances the
/// program counter by 4 after fetching one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Opcode {
    /// Loads a word from memory.
    ///
    /// | Operation | `rd = MEM[rs1 + off]` |
    /// | Syntax    | `load rd, [rs1+off]`  |
    LOAD(RegisterId, RegisterId, Offset12) = OP_LOAD,

    /// Stores a word to memory.
    ///
    /// | Operation | `MEM[rs1 + off] = rd` |
    /// | Syntax    | `store rd, [rs1+off]` |
    STORE(RegisterId, RegisterId, Offset12) = OP_STORE,

    /// Pushes a register; `sp` moves down by 4 first.
    PUSH(RegisterId) = OP_PUSH,

    /// Pops the word at `sp` into a register; `sp` moves up by 4.
    POP(RegisterId) = OP_POP,

    /// Loads a byte from memory, zero-extended.
    LOADB(RegisterId, RegisterId, Offset12) = OP_LOADB,

    /// Stores the low byte of a register.
    STOREB(RegisterId, RegisterId, Offset12) = OP_STOREB,

    /// Adds two registers.
    ///
    /// | Operation | `rd = rs1 + rs2`    |
    /// | Syntax    | `add rd, rs1, rs2`  |
    ///
    /// `CARRY` is set on unsigned overflow, `OVERFLOW` on signed
    /// overflow; `ZERO` and `NEGATIVE` follow the result.
    ADD(RegisterId, RegisterId, RegisterId) = OP_ADD,

    /// Subtracts two registers.
    ///
    /// | Operation | `rd = rs1 - rs2`    |
    /// | Syntax    | `sub rd, rs1, rs2`  |
    ///
    /// `CARRY` is the unsigned borrow (`rs1 < rs2`); `OVERFLOW` is the
    /// signed overflow of the subtraction.
    SUB(RegisterId, RegisterId, RegisterId) = OP_SUB,

    /// Multiplies two registers, keeping the low 32 bits of the signed
    /// product. Only `ZERO` and `NEGATIVE` are updated.
    MUL(RegisterId, RegisterId, RegisterId) = OP_MUL,

    /// Signed truncated division. Divisor zero is a fatal trap.
    DIV(RegisterId, RegisterId, RegisterId) = OP_DIV,

    /// Signed remainder. Divisor zero is a fatal trap.
    MOD(RegisterId, RegisterId, RegisterId) = OP_MOD,

    /// Bitwise AND of two registers.
    AND(RegisterId, RegisterId, RegisterId) = OP_AND,

    /// Bitwise OR of two registers.
    OR(RegisterId, RegisterId, RegisterId) = OP_OR,

    /// Bitwise XOR of two registers.
    XOR(RegisterId, RegisterId, RegisterId) = OP_XOR,

    /// Bitwise complement.
    ///
    /// | Operation | `rd = !rs1`    |
    /// | Syntax    | `not rd, rs1`  |
    NOT(RegisterId, RegisterId) = OP_NOT,

    /// Shifts left; the amount comes from `rs2`, masked to 5 bits.
    /// Zeroes are shifted in.
    SHL(RegisterId, RegisterId, RegisterId) = OP_SHL,

    /// Logical shift right; the amount comes from `rs2`, masked to
    /// 5 bits. Zeroes are shifted in.
    SHR(RegisterId, RegisterId, RegisterId) = OP_SHR,

    /// Increments a register by one, with full arithmetic flags.
    INC(RegisterId) = OP_INC,

    /// Decrements a register by one, with full arithmetic flags.
    DEC(RegisterId) = OP_DEC,

    /// Two's-complement negation, flagged as `0 - rd`.
    NEG(RegisterId) = OP_NEG,

    /// Unconditional jump to a 24-bit absolute address.
    JMP(Address24) = OP_JMP,

    /// Jump if `ZERO` is set.
    JZ(Address24) = OP_JZ,

    /// Jump if `ZERO` is clear.
    JNZ(Address24) = OP_JNZ,

    /// Jump if equal; same condition as [`Opcode::JZ`] under a distinct
    /// encoding.
    JEQ(Address24) = OP_JEQ,

    /// Jump if not equal; same condition as [`Opcode::JNZ`] under a
    /// distinct encoding.
    JNE(Address24) = OP_JNE,

    /// Jump if signed less-than (`NEGATIVE != OVERFLOW`).
    JLT(Address24) = OP_JLT,

    /// Jump if signed greater-than (not `ZERO` and
    /// `NEGATIVE == OVERFLOW`).
    JGT(Address24) = OP_JGT,

    /// Pushes the advanced `pc` and jumps to a 24-bit absolute address.
    CALL(Address24) = OP_CALL,

    /// Pops the return address into `pc`.
    RET = OP_RET,

    /// Jump if signed less-or-equal.
    JLE(Address24) = OP_JLE,

    /// Jump if signed greater-or-equal.
    JGE(Address24) = OP_JGE,

    /// Copies one register to another. Flags are untouched.
    MOV(RegisterId, RegisterId) = OP_MOV,

    /// Loads a 16-bit immediate, sign-extended to 32 bits. Flags are
    /// untouched.
    ///
    /// | Operation | `rd = sext(imm16)` |
    /// | Syntax    | `movi rd, #imm`    |
    MOVI(RegisterId, Immediate16) = OP_MOVI,

    /// Compares two registers: computes `rs1 - rs2`, discards the
    /// result and updates all flags exactly as [`Opcode::SUB`].
    CMP(RegisterId, RegisterId) = OP_CMP,

    /// System call; the syscall number is read from `r0` when the
    /// instruction executes and the result lands in `r0`.
    SYSCALL = OP_SYSCALL,

    /// Stops the machine. Halted is terminal until reset.
    HALT = OP_HALT,

    /// Performs no operation.
    NOP = OP_NOP,

    /// Undefined opcode; preserves the raw word for error reporting and
    /// `db`-style disassembly.
    Undefined(RawInstruction),
}

impl Opcode {
    /// Size of an encoded instruction in bytes
    pub const LEN: usize = 4;

    /// Build an [`Opcode`] from its pre-extracted encoding fields.
    pub const fn new(
        op: u8,
        rd: RegisterId,
        rs1: RegisterId,
        rs2: RegisterId,
        imm16: Immediate16,
        off12: Offset12,
        addr24: Address24,
        raw: RawInstruction,
    ) -> Self {
        use Opcode::*;

        match op {
            OP_LOAD => LOAD(rd, rs1, off12),
            OP_STORE => STORE(rd, rs1, off12),
            OP_PUSH => PUSH(rd),
            OP_POP => POP(rd),
            OP_LOADB => LOADB(rd, rs1, off12),
            OP_STOREB => STOREB(rd, rs1, off12),
            OP_ADD => ADD(rd, rs1, rs2),
            OP_SUB => SUB(rd, rs1, rs2),
            OP_MUL => MUL(rd, rs1, rs2),
            OP_DIV => DIV(rd, rs1, rs2),
            OP_MOD => MOD(rd, rs1, rs2),
            OP_AND => AND(rd, rs1, rs2),
            OP_OR => OR(rd, rs1, rs2),
            OP_XOR => XOR(rd, rs1, rs2),
            OP_NOT => NOT(rd, rs1),
            OP_SHL => SHL(rd, rs1, rs2),
            OP_SHR => SHR(rd, rs1, rs2),
            OP_INC => INC(rd),
            OP_DEC => DEC(rd),
            OP_NEG => NEG(rd),
            OP_JMP => JMP(addr24),
            OP_JZ => JZ(addr24),
            OP_JNZ => JNZ(addr24),
            OP_JEQ => JEQ(addr24),
            OP_JNE => JNE(addr24),
            OP_JLT => JLT(addr24),
            OP_JGT => JGT(addr24),
            OP_CALL => CALL(addr24),
            OP_RET => RET,
            OP_JLE => JLE(addr24),
            OP_JGE => JGE(addr24),
            OP_MOV => MOV(rd, rs1),
            OP_MOVI => MOVI(rd, imm16),
            OP_CMP => CMP(rs1, rs2),
            OP_SYSCALL => SYSCALL,
            OP_HALT => HALT,
            OP_NOP => NOP,
            _ => Undefined(raw),
        }
    }

    /// The fieldless twin of this opcode; `None` for
    /// [`Opcode::Undefined`].
    pub const fn repr(&self) -> Option<OpcodeRepr> {
        use Opcode::*;

        let repr = match self {
            LOAD(..) => OpcodeRepr::LOAD,
            STORE(..) => OpcodeRepr::STORE,
            PUSH(_) => OpcodeRepr::PUSH,
            POP(_) => OpcodeRepr::POP,
            LOADB(..) => OpcodeRepr::LOADB,
            STOREB(..) => OpcodeRepr::STOREB,
            ADD(..) => OpcodeRepr::ADD,
            SUB(..) => OpcodeRepr::SUB,
            MUL(..) => OpcodeRepr::MUL,
            DIV(..) => OpcodeRepr::DIV,
            MOD(..) => OpcodeRepr::MOD,
            AND(..) => OpcodeRepr::AND,
            OR(..) => OpcodeRepr::OR,
            XOR(..) => OpcodeRepr::XOR,
            NOT(..) => OpcodeRepr::NOT,
            SHL(..) => OpcodeRepr::SHL,
            SHR(..) => OpcodeRepr::SHR,
            INC(_) => OpcodeRepr::INC,
            DEC(_) => OpcodeRepr::DEC,
            NEG(_) => OpcodeRepr::NEG,
            JMP(_) => OpcodeRepr::JMP,
            JZ(_) => OpcodeRepr::JZ,
            JNZ(_) => OpcodeRepr::JNZ,
            JEQ(_) => OpcodeRepr::JEQ,
            JNE(_) => OpcodeRepr::JNE,
            JLT(_) => OpcodeRepr::JLT,
            JGT(_) => OpcodeRepr::JGT,
            CALL(_) => OpcodeRepr::CALL,
            RET => OpcodeRepr::RET,
            JLE(_) => OpcodeRepr::JLE,
            JGE(_) => OpcodeRepr::JGE,
            MOV(..) => OpcodeRepr::MOV,
            MOVI(..) => OpcodeRepr::MOVI,
            CMP(..) => OpcodeRepr::CMP,
            SYSCALL => OpcodeRepr::SYSCALL,
            HALT => OpcodeRepr::HALT,
            NOP => OpcodeRepr::NOP,
            Undefined(_) => return None,
        };

        Some(repr)
    }

    /// Encoded bytes of the instruction, little-endian.
    pub fn to_bytes(self) -> [u8; Self::LEN] {
        u32::from(self).to_le_bytes()
    }
}

impl From<u32> for Opcode {
    fn from(instruction: u32) -> Self {
        let op = (instruction >> 24) as u8;

        let rd = ((instruction >> 16) & 0x0f) as RegisterId;
        let rs1 = ((instruction >> 12) & 0x0f) as RegisterId;
        let rs2 = ((instruction >> 8) & 0x0f) as RegisterId;

        let imm16 = (instruction & 0xffff) as Immediate16;
        let off12 = (instruction & 0x0fff) as Offset12;
        let addr24 = instruction & 0x00ff_ffff;

        Self::new(op, rd, rs1, rs2, imm16, off12, addr24, instruction)
    }
}

impl From<[u8; Opcode::LEN]> for Opcode {
    fn from(bytes: [u8; Opcode::LEN]) -> Self {
        u32::from_le_bytes(bytes).into()
    }
}

impl From<Opcode> for u32 {
    fn from(opcode: Opcode) -> u32 {
        use Opcode::*;

        match opcode {
            LOAD(rd, rs1, off) => mem(OP_LOAD, rd, rs1, off),
            STORE(rd, rs1, off) => mem(OP_STORE, rd, rs1, off),
            PUSH(rd) => single(OP_PUSH, rd),
            POP(rd) => single(OP_POP, rd),
            LOADB(rd, rs1, off) => mem(OP_LOADB, rd, rs1, off),
            STOREB(rd, rs1, off) => mem(OP_STOREB, rd, rs1, off),
            ADD(rd, rs1, rs2) => ternary(OP_ADD, rd, rs1, rs2),
            SUB(rd, rs1, rs2) => ternary(OP_SUB, rd, rs1, rs2),
            MUL(rd, rs1, rs2) => ternary(OP_MUL, rd, rs1, rs2),
            DIV(rd, rs1, rs2) => ternary(OP_DIV, rd, rs1, rs2),
            MOD(rd, rs1, rs2) => ternary(OP_MOD, rd, rs1, rs2),
            AND(rd, rs1, rs2) => ternary(OP_AND, rd, rs1, rs2),
            OR(rd, rs1, rs2) => ternary(OP_OR, rd, rs1, rs2),
            XOR(rd, rs1, rs2) => ternary(OP_XOR, rd, rs1, rs2),
            NOT(rd, rs1) => binary(OP_NOT, rd, rs1),
            SHL(rd, rs1, rs2) => ternary(OP_SHL, rd, rs1, rs2),
            SHR(rd, rs1, rs2) => ternary(OP_SHR, rd, rs1, rs2),
            INC(rd) => single(OP_INC, rd),
            DEC(rd) => single(OP_DEC, rd),
            NEG(rd) => single(OP_NEG, rd),
            JMP(addr) => branch(OP_JMP, addr),
            JZ(addr) => branch(OP_JZ, addr),
            JNZ(addr) => branch(OP_JNZ, addr),
            JEQ(addr) => branch(OP_JEQ, addr),
            JNE(addr) => branch(OP_JNE, addr),
            JLT(addr) => branch(OP_JLT, addr),
            JGT(addr) => branch(OP_JGT, addr),
            CALL(addr) => branch(OP_CALL, addr),
            RET => bare(OP_RET),
            JLE(addr) => branch(OP_JLE, addr),
            JGE(addr) => branch(OP_JGE, addr),
            MOV(rd, rs1) => binary(OP_MOV, rd, rs1),
            MOVI(rd, imm) => {
                ((OP_MOVI as u32) << 24) | reg_field(rd, 16) | (imm as u32)
            }
            CMP(rs1, rs2) => {
                ((OP_CMP as u32) << 24) | reg_field(rs1, 12) | reg_field(rs2, 8)
            }
            SYSCALL => bare(OP_SYSCALL),
            HALT => bare(OP_HALT),
            NOP => bare(OP_NOP),
            Undefined(raw) => raw,
        }
    }
}

const fn reg_field(reg: RegisterId, shift: u32) -> u32 {
    ((reg as u32) & 0x0f) << shift
}

const fn bare(op: u8) -> u32 {
    (op as u32) << 24
}

const fn single(op: u8, rd: RegisterId) -> u32 {
    bare(op) | reg_field(rd, 16)
}

const fn binary(op: u8, rd: RegisterId, rs1: RegisterId) -> u32 {
    bare(op) | reg_field(rd, 16) | reg_field(rs1, 12)
}

const fn ternary(op: u8, rd: RegisterId, rs1: RegisterId, rs2: RegisterId) -> u32 {
    bare(op) | reg_field(rd, 16) | reg_field(rs1, 12) | reg_field(rs2, 8)
}

const fn mem(op: u8, rd: RegisterId, rs1: RegisterId, off: Offset12) -> u32 {
    bare(op) | reg_field(rd, 16) | reg_field(rs1, 12) | ((off as u32) & 0x0fff)
}

const fn branch(op: u8, addr: Address24) -> u32 {
    bare(op) | (addr & 0x00ff_ffff)
}

/// Fieldless opcode identifier, one per defined encoding.
///
/// Used to sweep the opcode table in tests and to validate opcode bytes
/// without decoding operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
#[allow(missing_docs)]
pub enum OpcodeRepr {
    LOAD = OP_LOAD,
    STORE = OP_STORE,
    PUSH = OP_PUSH,
    POP = OP_POP,
    LOADB = OP_LOADB,
    STOREB = OP_STOREB,
    ADD = OP_ADD,
    SUB = OP_SUB,
    MUL = OP_MUL,
    DIV = OP_DIV,
    MOD = OP_MOD,
    AND = OP_AND,
    OR = OP_OR,
    XOR = OP_XOR,
    NOT = OP_NOT,
    SHL = OP_SHL,
    SHR = OP_SHR,
    INC = OP_INC,
    DEC = OP_DEC,
    NEG = OP_NEG,
    JMP = OP_JMP,
    JZ = OP_JZ,
    JNZ = OP_JNZ,
    JEQ = OP_JEQ,
    JNE = OP_JNE,
    JLT = OP_JLT,
    JGT = OP_JGT,
    CALL = OP_CALL,
    RET = OP_RET,
    JLE = OP_JLE,
    JGE = OP_JGE,
    MOV = OP_MOV,
    MOVI = OP_MOVI,
    CMP = OP_CMP,
    SYSCALL = OP_SYSCALL,
    HALT = OP_HALT,
    NOP = OP_NOP,
}

impl OpcodeRepr {
    /// Assembly mnemonic for this opcode.
    pub const fn mnemonic(self) -> &'static str {
        use OpcodeRepr::*;

        match self {
            LOAD => "load",
            STORE => "store",
            PUSH => "push",
            POP => "pop",
            LOADB => "loadb",
            STOREB => "storeb",
            ADD => "add",
            SUB => "sub",
            MUL => "mul",
            DIV => "div",
            MOD => "mod",
            AND => "and",
            OR => "or",
            XOR => "xor",
            NOT => "not",
            SHL => "shl",
            SHR => "shr",
            INC => "inc",
            DEC => "dec",
            NEG => "neg",
            JMP => "jmp",
            JZ => "jz",
            JNZ => "jnz",
            JEQ => "jeq",
            JNE => "jne",
            JLT => "jlt",
            JGT => "jgt",
            CALL => "call",
            RET => "ret",
            JLE => "jle",
            JGE => "jge",
            MOV => "mov",
            MOVI => "movi",
            CMP => "cmp",
            SYSCALL => "syscall",
            HALT => "halt",
            NOP => "nop",
        }
    }
}

/// The byte can't be mapped to any defined opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InvalidOpcode(pub u8);

impl fmt::Display for InvalidOpcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid opcode byte 0x{:02x}", self.0)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for InvalidOpcode {}

impl TryFrom<u8> for OpcodeRepr {
    type Error = InvalidOpcode;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        use OpcodeRepr::*;

        let repr = match byte {
            OP_LOAD => LOAD,
            OP_STORE => STORE,
            OP_PUSH => PUSH,
            OP_POP => POP,
            OP_LOADB => LOADB,
            OP_STOREB => STOREB,
            OP_ADD => ADD,
            OP_SUB => SUB,
            OP_MUL => MUL,
            OP_DIV => DIV,
            OP_MOD => MOD,
            OP_AND => AND,
            OP_OR => OR,
            OP_XOR => XOR,
            OP_NOT => NOT,
            OP_SHL => SHL,
            OP_SHR => SHR,
            OP_INC => INC,
            OP_DEC => DEC,
            OP_NEG => NEG,
            OP_JMP => JMP,
            OP_JZ => JZ,
            OP_JNZ => JNZ,
            OP_JEQ => JEQ,
            OP_JNE => JNE,
            OP_JLT => JLT,
            OP_JGT => JGT,
            OP_CALL => CALL,
            OP_RET => RET,
            OP_JLE => JLE,
            OP_JGE => JGE,
            OP_MOV => MOV,
            OP_MOVI => MOVI,
            OP_CMP => CMP,
            OP_SYSCALL => SYSCALL,
            OP_HALT => HALT,
            OP_NOP => NOP,
            _ => return Err(InvalidOpcode(byte)),
        };

        Ok(repr)
    }
}

impl From<OpcodeRepr> for u8 {
    fn from(repr: OpcodeRepr) -> u8 {
        repr as u8
    }
}
