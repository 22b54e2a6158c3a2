use super::{alu, HostIo, Interpreter};
use crate::consts::WORD_SIZE;
use crate::error::VmError;
use crate::state::ExecuteState;

use burst_asm::{Flags, Opcode, Word};

impl<H> Interpreter<H>
where
    H: HostIo,
{
    /// Execute the instruction at `pc`.
    ///
    /// Fetches the little-endian word at `pc`, advances `pc` by 4, then
    /// dispatches. A fatal trap halts the machine, records the fault
    /// and is returned as the error. Stepping a halted machine is a
    /// no-op.
    pub fn step(&mut self) -> Result<ExecuteState, VmError> {
        if self.halted {
            return Ok(ExecuteState::Halted);
        }

        match self.step_inner() {
            Ok(state) => Ok(state),
            Err(trap) => {
                self.halted = true;
                self.fault = Some(trap);
                tracing::debug!(%trap, pc = self.pc, "fatal trap");
                Err(trap)
            }
        }
    }

    fn step_inner(&mut self) -> Result<ExecuteState, VmError> {
        let raw = self.memory.read_word(self.pc)?;
        let opcode = Opcode::from(raw);

        tracing::trace!(pc = self.pc, op = %opcode, "execute");

        self.pc = self.pc.wrapping_add(WORD_SIZE as Word);

        self.execute(opcode)
    }

    fn execute(&mut self, opcode: Opcode) -> Result<ExecuteState, VmError> {
        use Opcode::*;

        match opcode {
            LOAD(rd, rs1, off) => {
                let addr = self.registers[rs1].wrapping_add(off as Word);
                self.registers[rd] = self.memory.read_word(addr)?;
            }

            STORE(rd, rs1, off) => {
                let addr = self.registers[rs1].wrapping_add(off as Word);
                self.memory.write_word(addr, self.registers[rd])?;
            }

            LOADB(rd, rs1, off) => {
                let addr = self.registers[rs1].wrapping_add(off as Word);
                self.registers[rd] = self.memory.read_byte(addr)? as Word;
            }

            STOREB(rd, rs1, off) => {
                let addr = self.registers[rs1].wrapping_add(off as Word);
                self.memory.write_byte(addr, self.registers[rd] as u8)?;
            }

            PUSH(rd) => self.push_word(self.registers[rd])?,

            POP(rd) => self.registers[rd] = self.pop_word()?,

            ADD(rd, rs1, rs2) => {
                let (result, flags) = alu::add(self.registers[rs1], self.registers[rs2]);
                self.registers[rd] = result;
                self.flags = flags;
            }

            SUB(rd, rs1, rs2) => {
                let (result, flags) = alu::sub(self.registers[rs1], self.registers[rs2]);
                self.registers[rd] = result;
                self.flags = flags;
            }

            MUL(rd, rs1, rs2) => {
                let (result, flags) = alu::mul(self.registers[rs1], self.registers[rs2]);
                self.registers[rd] = result;
                self.flags = flags;
            }

            DIV(rd, rs1, rs2) => {
                let (result, flags) = alu::div(self.registers[rs1], self.registers[rs2])?;
                self.registers[rd] = result;
                self.flags = flags;
            }

            MOD(rd, rs1, rs2) => {
                let (result, flags) = alu::rem(self.registers[rs1], self.registers[rs2])?;
                self.registers[rd] = result;
                self.flags = flags;
            }

            AND(rd, rs1, rs2) => {
                let result = self.registers[rs1] & self.registers[rs2];
                self.registers[rd] = result;
                self.flags = Flags::from_result(result);
            }

            OR(rd, rs1, rs2) => {
                let result = self.registers[rs1] | self.registers[rs2];
                self.registers[rd] = result;
                self.flags = Flags::from_result(result);
            }

            XOR(rd, rs1, rs2) => {
                let result = self.registers[rs1] ^ self.registers[rs2];
                self.registers[rd] = result;
                self.flags = Flags::from_result(result);
            }

            NOT(rd, rs1) => {
                let result = !self.registers[rs1];
                self.registers[rd] = result;
                self.flags = Flags::from_result(result);
            }

            SHL(rd, rs1, rs2) => {
                let (result, flags) = alu::shl(self.registers[rs1], self.registers[rs2]);
                self.registers[rd] = result;
                self.flags = flags;
            }

            SHR(rd, rs1, rs2) => {
                let (result, flags) = alu::shr(self.registers[rs1], self.registers[rs2]);
                self.registers[rd] = result;
                self.flags = flags;
            }

            INC(rd) => {
                let (result, flags) = alu::add(self.registers[rd], 1);
                self.registers[rd] = result;
                self.flags = flags;
            }

            DEC(rd) => {
                let (result, flags) = alu::sub(self.registers[rd], 1);
                self.registers[rd] = result;
                self.flags = flags;
            }

            NEG(rd) => {
                let (result, flags) = alu::sub(0, self.registers[rd]);
                self.registers[rd] = result;
                self.flags = flags;
            }

            JMP(addr) => self.pc = addr,

            JZ(addr) | JEQ(addr) => {
                if self.flags.zero() {
                    self.pc = addr;
                }
            }

            JNZ(addr) | JNE(addr) => {
                if !self.flags.zero() {
                    self.pc = addr;
                }
            }

            JLT(addr) => {
                if self.flags.lt() {
                    self.pc = addr;
                }
            }

            JGT(addr) => {
                if self.flags.gt() {
                    self.pc = addr;
                }
            }

            JLE(addr) => {
                if self.flags.le() {
                    self.pc = addr;
                }
            }

            JGE(addr) => {
                if self.flags.ge() {
                    self.pc = addr;
                }
            }

            CALL(addr) => {
                self.push_word(self.pc)?;
                self.pc = addr;
            }

            RET => self.pc = self.pop_word()?,

            MOV(rd, rs1) => self.registers[rd] = self.registers[rs1],

            MOVI(rd, imm) => self.registers[rd] = imm as i16 as i32 as Word,

            CMP(rs1, rs2) => {
                let (_, flags) = alu::sub(self.registers[rs1], self.registers[rs2]);
                self.flags = flags;
            }

            SYSCALL => return self.syscall(),

            HALT => {
                self.halted = true;
                return Ok(ExecuteState::Halted);
            }

            NOP => (),

            Undefined(raw) => return Err(VmError::UnknownOpcode((raw >> 24) as u8)),
        }

        Ok(ExecuteState::Proceed)
    }

    /// Move `sp` down one word and store `value` there. The stack
    /// cannot leave memory.
    pub(crate) fn push_word(&mut self, value: Word) -> Result<(), VmError> {
        let sp = self
            .sp
            .checked_sub(WORD_SIZE as Word)
            .ok_or(VmError::StackOverflow)?;

        self.memory
            .write_word(sp, value)
            .map_err(|_| VmError::StackOverflow)?;

        self.sp = sp;
        Ok(())
    }

    /// Read the word at `sp` and move `sp` up by one word.
    pub(crate) fn pop_word(&mut self) -> Result<Word, VmError> {
        let value = self
            .memory
            .read_word(self.sp)
            .map_err(|_| VmError::StackUnderflow)?;

        self.sp = self.sp.wrapping_add(WORD_SIZE as Word);
        Ok(value)
    }
}
