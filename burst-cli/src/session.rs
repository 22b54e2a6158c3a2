use crate::command::{Command, InfoTarget};
use crate::expr::{self, RegRef};

use burst_asm::{disassemble, Word};
use burst_assembler::AssembleError;
use burst_vm::error::VmError;
use burst_vm::interpreter::{HostIo, Interpreter, Stdio};
use burst_vm::state::{ExecuteState, StopReason};

use itertools::Itertools;

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// A command failure. None of these are fatal: the shell prints the
/// error and returns to the prompt.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The command name is not in the table.
    #[error("unknown command `{0}`")]
    UnknownCommand(String),

    /// Arguments do not fit the command.
    #[error("usage: {0}")]
    Usage(&'static str),

    /// An address argument that does not parse.
    #[error("bad address `{0}`")]
    BadAddress(String),

    /// A `print`/`set` expression that does not evaluate.
    #[error("bad expression `{0}`")]
    BadExpression(String),

    /// `set` with a name that is not a register.
    #[error("unknown register `{0}`")]
    UnknownRegister(String),

    /// The machine trapped; it is halted until `reset`.
    #[error("vm fault: {0}")]
    Vm(#[from] VmError),

    /// The assembler rejected the source.
    #[error(transparent)]
    Assemble(#[from] AssembleError),

    /// File I/O failure, with the path involved.
    #[error("{}: {source}", .path.display())]
    File {
        /// Path of the file being read or written
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

/// What the shell loop should do after a command.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Show this text (possibly empty) and prompt again.
    Continue(String),
    /// Leave the shell.
    Quit,
}

/// One debugger session: the machine plus the loaded symbol table.
#[derive(Debug)]
pub struct Session<H = Stdio> {
    vm: Interpreter<H>,
    symbols: BTreeMap<String, Word>,
}

impl<H> Session<H>
where
    H: HostIo,
{
    /// Wrap a machine in a session.
    pub fn new(vm: Interpreter<H>) -> Self {
        Self {
            vm,
            symbols: BTreeMap::new(),
        }
    }

    /// The machine, for inspection.
    pub fn vm(&self) -> &Interpreter<H> {
        &self.vm
    }

    /// Flush guest output; the shell calls this before each prompt.
    pub fn flush(&mut self) {
        self.vm.host_mut().flush();
    }

    /// Split a raw input line and execute it.
    pub fn execute_line(&mut self, line: &str) -> Result<Outcome, SessionError> {
        let args: Vec<&str> = line.split_whitespace().collect();

        if args.is_empty() {
            return Ok(Outcome::Continue(String::new()));
        }

        let command = Command::parse(&args)?;
        self.execute(command)
    }

    /// Execute one parsed command.
    pub fn execute(&mut self, command: Command) -> Result<Outcome, SessionError> {
        let text = match command {
            Command::Run { file } => {
                if let Some(path) = &file {
                    self.load_binary(path)?;
                }

                let stop = self.vm.run()?;
                self.describe_stop(stop)
            }

            Command::Continue => {
                let stop = self.vm.resume()?;
                self.describe_stop(stop)
            }

            Command::Step { count } => {
                let mut lines = Vec::new();

                for _ in 0..count {
                    if self.vm.halted() {
                        lines.push("machine is halted".to_owned());
                        break;
                    }

                    let pc = self.vm.pc();
                    let listing = match self.vm.memory().read_word(pc) {
                        Ok(word) => disassemble(word),
                        Err(_) => "??".to_owned(),
                    };
                    lines.push(format!("0x{pc:08x}: {listing}"));

                    if self.vm.step()? == ExecuteState::Halted {
                        lines.push(self.describe_stop(StopReason::Halted));
                        break;
                    }
                }

                lines.join("\n")
            }

            Command::Break { addr } => match addr {
                Some(addr) => {
                    if self.vm.toggle_breakpoint(addr) {
                        format!("breakpoint set at 0x{addr:08x}")
                    } else {
                        format!("breakpoint cleared at 0x{addr:08x}")
                    }
                }
                None => self.format_breaks(),
            },

            Command::Watch { addr } => match addr {
                Some(addr) => {
                    if self.vm.toggle_watchpoint(addr)? {
                        format!("watchpoint set at 0x{addr:08x}")
                    } else {
                        format!("watchpoint cleared at 0x{addr:08x}")
                    }
                }
                None => self.format_watches(),
            },

            Command::Info(InfoTarget::Regs) => self.format_regs(),
            Command::Info(InfoTarget::Breaks) => {
                let mut text = self.format_breaks();
                let watches = self.format_watches();
                if !watches.is_empty() {
                    text.push('\n');
                    text.push_str(&watches);
                }
                text
            }
            Command::Info(InfoTarget::Mem { addr, len }) => self.format_mem(addr, len)?,

            Command::Print { expr } => {
                let value = expr::eval(&self.vm, &self.symbols, &expr)?;
                format!("{expr} = {value} (0x{value:08x})")
            }

            Command::Set { target, value } => {
                let reg = expr::parse_reg(&target)
                    .ok_or_else(|| SessionError::UnknownRegister(target.clone()))?;
                let value = expr::eval(&self.vm, &self.symbols, &value)?;

                match reg {
                    RegRef::Gpr(id) => self.vm.set_register(id, value),
                    RegRef::Pc => self.vm.set_pc(value),
                    RegRef::Sp => self.vm.set_sp(value),
                }

                format!("{} = 0x{value:08x}", target.to_ascii_lowercase())
            }

            Command::Disasm { addr, count } => {
                let start = addr.unwrap_or_else(|| self.vm.pc());
                let mut lines = Vec::new();

                for index in 0..count {
                    let at = start.wrapping_add((index as Word) * 4);
                    match self.vm.memory().read_word(at) {
                        Ok(word) => lines.push(format!("0x{at:08x}: {}", disassemble(word))),
                        Err(_) => break,
                    }
                }

                lines.join("\n")
            }

            Command::Load { file } => self.load_binary(&file)?,

            Command::Save { file } => {
                std::fs::write(&file, self.vm.memory().as_slice()).map_err(|source| {
                    SessionError::File {
                        path: file.clone(),
                        source,
                    }
                })?;

                format!("wrote {} bytes to {}", self.vm.memory().len(), file.display())
            }

            Command::Reset => {
                self.vm.reset();
                "machine reset".to_owned()
            }

            Command::Assemble { file, load } => self.assemble(&file, load)?,

            Command::Quit => return Ok(Outcome::Quit),
        };

        Ok(Outcome::Continue(text))
    }

    fn load_binary(&mut self, path: &Path) -> Result<String, SessionError> {
        let bytes = std::fs::read(path).map_err(|source| SessionError::File {
            path: path.to_owned(),
            source,
        })?;

        self.vm.load_program(&bytes)?;

        Ok(format!(
            "loaded {} bytes at 0x00000000 from {}",
            bytes.len(),
            path.display()
        ))
    }

    fn assemble(&mut self, path: &Path, load: bool) -> Result<String, SessionError> {
        let source = std::fs::read_to_string(path).map_err(|source| SessionError::File {
            path: path.to_owned(),
            source,
        })?;

        let assembly = burst_assembler::assemble(&source)?;

        let out_path = path.with_extension("bin");
        std::fs::write(&out_path, &assembly.bytes).map_err(|source| SessionError::File {
            path: out_path.clone(),
            source,
        })?;

        let mut text = format!(
            "assembled {} bytes to {}",
            assembly.bytes.len(),
            out_path.display()
        );

        if load {
            self.vm.load_program(&assembly.bytes)?;
            self.symbols = assembly.labels;
            let _ = write!(text, "; loaded at 0x00000000");
        }

        Ok(text)
    }

    fn describe_stop(&self, stop: StopReason) -> String {
        match stop {
            StopReason::Breakpoint(addr) => format!("breakpoint hit at 0x{addr:08x}"),
            StopReason::Watchpoint { addr, old, new } => {
                format!("watchpoint hit at 0x{addr:08x}: 0x{old:08x} -> 0x{new:08x}")
            }
            StopReason::Halted => match self.vm.exit_code() {
                Some(code) => format!("machine halted (exit code {code})"),
                None => "machine halted".to_owned(),
            },
        }
    }

    fn format_regs(&self) -> String {
        let mut text = String::new();

        for chunk in &self.vm.registers().iter().enumerate().chunks(4) {
            let line = chunk
                .map(|(id, value)| format!("r{id:<2} = 0x{value:08x}"))
                .join("  ");
            text.push_str(&line);
            text.push('\n');
        }

        let _ = write!(
            text,
            "pc  = 0x{:08x}  sp  = 0x{:08x}  flags = {:04b}",
            self.vm.pc(),
            self.vm.sp(),
            self.vm.flags().bits()
        );

        text
    }

    fn format_mem(&self, addr: Word, len: u32) -> Result<String, SessionError> {
        let bytes = self.vm.memory().read_bytes(addr, len as usize)?;
        let mut text = String::new();

        for (index, row) in bytes.chunks(16).enumerate() {
            let offset = addr + (index as Word) * 16;
            let hex = row.iter().map(|byte| format!("{byte:02x}")).join(" ");
            let ascii: String = row
                .iter()
                .map(|&byte| {
                    if byte.is_ascii_graphic() || byte == b' ' {
                        byte as char
                    } else {
                        '.'
                    }
                })
                .collect();

            let _ = writeln!(text, "0x{offset:08x}  {hex:<47}  |{ascii}|");
        }

        // Drop the trailing newline for uniform joining.
        text.truncate(text.trim_end().len());

        Ok(text)
    }

    fn format_breaks(&self) -> String {
        let breakpoints = self.vm.breakpoints();

        if breakpoints.is_empty() {
            return "no breakpoints".to_owned();
        }

        breakpoints
            .iter()
            .map(|addr| format!("breakpoint at 0x{addr:08x}"))
            .join("\n")
    }

    fn format_watches(&self) -> String {
        let watchpoints = self.vm.watchpoints();

        if watchpoints.is_empty() {
            return "no watchpoints".to_owned();
        }

        watchpoints
            .iter()
            .map(|(addr, value)| format!("watchpoint at 0x{addr:08x} (last 0x{value:08x})"))
            .join("\n")
    }
}

impl Default for Session<Stdio> {
    fn default() -> Self {
        Self::new(Interpreter::new())
    }
}
