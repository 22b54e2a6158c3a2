use crate::expr;
use crate::session::SessionError;

use burst_asm::Word;

use std::path::PathBuf;

/// The closed command set of the shell, parsed from a whitespace-split
/// argument vector. Addresses accept `0x` hex or decimal; register
/// names are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `run [file]` - optionally load a binary, then execute until halt
    /// or a debug stop.
    Run {
        /// Binary image to load first
        file: Option<PathBuf>,
    },
    /// `step [n]` - single-step, printing each instruction.
    Step {
        /// Instruction count, default 1
        count: u64,
    },
    /// `continue` - resume from the current `pc`.
    Continue,
    /// `break [addr]` - toggle a breakpoint, or list them.
    Break {
        /// Address to toggle; `None` lists
        addr: Option<Word>,
    },
    /// `watch [addr]` - toggle a watchpoint, or list them.
    Watch {
        /// Address to toggle; `None` lists
        addr: Option<Word>,
    },
    /// `info regs|mem|breaks` - dump machine state.
    Info(InfoTarget),
    /// `print expr` - evaluate and print.
    Print {
        /// Expression text
        expr: String,
    },
    /// `set reg value` - assign a register, `pc` or `sp`.
    Set {
        /// Register name
        target: String,
        /// Value expression
        value: String,
    },
    /// `disasm [addr] [n]` - disassemble `n` instructions.
    Disasm {
        /// Start address, default `pc`
        addr: Option<Word>,
        /// Instruction count
        count: u64,
    },
    /// `load file` - load a binary at address zero.
    Load {
        /// Binary image
        file: PathBuf,
    },
    /// `save file` - write the memory buffer out.
    Save {
        /// Destination file
        file: PathBuf,
    },
    /// `reset` - fresh machine.
    Reset,
    /// `assemble file [-l|--load]` - assemble, optionally load.
    Assemble {
        /// Source file
        file: PathBuf,
        /// Load the output into the machine
        load: bool,
    },
    /// `quit` - leave the shell.
    Quit,
}

/// Target of the `info` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InfoTarget {
    /// `info regs` - register file, `pc`, `sp` and flags
    Regs,
    /// `info mem [addr] [len]` - hex dump
    Mem {
        /// First address
        addr: Word,
        /// Byte count
        len: u32,
    },
    /// `info breaks` - breakpoints and watchpoints
    Breaks,
}

impl Command {
    /// Parse one argument vector. The first element selects the
    /// command; the rest are its arguments.
    pub fn parse(args: &[&str]) -> Result<Self, SessionError> {
        let (&name, rest) = args
            .split_first()
            .ok_or(SessionError::Usage("expected a command"))?;

        let command = match name {
            "run" => match rest {
                [] => Self::Run { file: None },
                [file] => Self::Run {
                    file: Some(PathBuf::from(*file)),
                },
                _ => return Err(SessionError::Usage("run [file]")),
            },

            "step" | "s" => match rest {
                [] => Self::Step { count: 1 },
                [count] => Self::Step {
                    count: expr::parse_word(count)
                        .ok_or(SessionError::Usage("step [n]"))?
                        .into(),
                },
                _ => return Err(SessionError::Usage("step [n]")),
            },

            "continue" | "c" => match rest {
                [] => Self::Continue,
                _ => return Err(SessionError::Usage("continue")),
            },

            "break" | "b" => match rest {
                [] => Self::Break { addr: None },
                [addr] => Self::Break {
                    addr: Some(parse_addr(addr)?),
                },
                _ => return Err(SessionError::Usage("break [addr]")),
            },

            "watch" | "w" => match rest {
                [] => Self::Watch { addr: None },
                [addr] => Self::Watch {
                    addr: Some(parse_addr(addr)?),
                },
                _ => return Err(SessionError::Usage("watch [addr]")),
            },

            "info" | "i" => match rest {
                ["regs"] => Self::Info(InfoTarget::Regs),
                ["breaks"] => Self::Info(InfoTarget::Breaks),
                ["mem", args @ ..] => {
                    let addr = match args.first() {
                        Some(text) => parse_addr(text)?,
                        None => 0,
                    };
                    let len = match args.get(1) {
                        Some(text) => parse_addr(text)?,
                        None => 64,
                    };

                    if args.len() > 2 {
                        return Err(SessionError::Usage("info mem [addr] [len]"));
                    }

                    Self::Info(InfoTarget::Mem { addr, len })
                }
                _ => return Err(SessionError::Usage("info regs|mem [addr] [len]|breaks")),
            },

            "print" | "p" => match rest {
                [] => return Err(SessionError::Usage("print expr")),
                parts => Self::Print {
                    expr: parts.join(" "),
                },
            },

            "set" => match rest {
                [target, value] => Self::Set {
                    target: (*target).to_owned(),
                    value: (*value).to_owned(),
                },
                _ => return Err(SessionError::Usage("set reg value")),
            },

            "disasm" | "d" => match rest {
                [] => Self::Disasm {
                    addr: None,
                    count: 10,
                },
                [addr] => Self::Disasm {
                    addr: Some(parse_addr(addr)?),
                    count: 10,
                },
                [addr, count] => Self::Disasm {
                    addr: Some(parse_addr(addr)?),
                    count: expr::parse_word(count)
                        .ok_or(SessionError::Usage("disasm [addr] [n]"))?
                        .into(),
                },
                _ => return Err(SessionError::Usage("disasm [addr] [n]")),
            },

            "load" => match rest {
                [file] => Self::Load {
                    file: PathBuf::from(*file),
                },
                _ => return Err(SessionError::Usage("load file")),
            },

            "save" => match rest {
                [file] => Self::Save {
                    file: PathBuf::from(*file),
                },
                _ => return Err(SessionError::Usage("save file")),
            },

            "reset" => match rest {
                [] => Self::Reset,
                _ => return Err(SessionError::Usage("reset")),
            },

            "assemble" | "asm" => match rest {
                [file] => Self::Assemble {
                    file: PathBuf::from(*file),
                    load: false,
                },
                [file, "-l" | "--load"] => Self::Assemble {
                    file: PathBuf::from(*file),
                    load: true,
                },
                _ => return Err(SessionError::Usage("assemble file [-l|--load]")),
            },

            "quit" | "q" | "exit" => match rest {
                [] => Self::Quit,
                _ => return Err(SessionError::Usage("quit")),
            },

            other => return Err(SessionError::UnknownCommand(other.to_owned())),
        };

        Ok(command)
    }
}

fn parse_addr(text: &str) -> Result<Word, SessionError> {
    expr::parse_word(text).ok_or_else(|| SessionError::BadAddress(text.to_owned()))
}
