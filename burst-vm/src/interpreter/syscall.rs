//! Syscall dispatch and the host I/O seam.
//!
//! The syscall number is taken from `r0` when `syscall` executes;
//! arguments come from `r1..r3` and the result or error code lands in
//! `r0`. Allocator and exit calls are serviced by the machine itself;
//! everything touching the outside world goes through [`HostIo`].

use super::Interpreter;
use crate::error::VmError;
use crate::state::ExecuteState;

use burst_asm::Word;

use std::io::{Read, Write};

/// Allocate heap memory: `r1` size, returns address or 0.
pub const SYS_ALLOC: Word = 1;
/// Release heap memory: `r1` address, returns [`E_OK`] or an error.
pub const SYS_FREE: Word = 2;
/// Resize an allocation: `r1` address, `r2` new size, returns the new
/// address or 0. Bytes are not copied on relocation.
pub const SYS_REALLOC: Word = 3;
/// Write to a file descriptor: `r1` fd, `r2` buffer, `r3` length.
pub const SYS_WRITE: Word = 11;
/// Halt with an exit code from `r1`; the code is stored in `r0`.
pub const SYS_EXIT: Word = 20;
/// Write a buffer to standard output: `r1` buffer, `r2` length.
pub const SYS_PRINT: Word = 30;
/// Write one character from the low byte of `r1`.
pub const SYS_PUTCHAR: Word = 32;
/// Read one character; returns it, or -1 at end of input.
pub const SYS_GETCHAR: Word = 33;

/// Success
pub const E_OK: Word = 0;
/// Out of memory
pub const E_NOMEM: Word = 1;
/// Bad file descriptor
pub const E_BADFD: Word = 2;
/// Not found
pub const E_NOTFOUND: Word = 3;
/// Permission denied
pub const E_PERM: Word = 4;
/// Host I/O failure
pub const E_IO: Word = 5;
/// Syscall not implemented
pub const E_NOSYS: Word = 6;
/// Invalid argument
pub const E_INVALID: Word = 7;

/// Failure reported by a [`HostIo`] operation, mapped into the guest
/// error-code registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostError {
    /// The descriptor is not wired to the host.
    BadFd,
    /// The underlying stream failed.
    Io,
}

impl HostError {
    /// Guest error code for this failure.
    pub const fn code(self) -> Word {
        match self {
            Self::BadFd => E_BADFD,
            Self::Io => E_IO,
        }
    }
}

/// Host side of the I/O syscalls.
///
/// The machine owns one implementation for its whole lifetime; tests
/// swap in a captured sink, the CLI uses process stdio.
pub trait HostIo {
    /// Write `bytes` to descriptor `fd` (1 stdout, 2 stderr).
    fn write(&mut self, fd: Word, bytes: &[u8]) -> Result<usize, HostError>;

    /// Emit one byte on standard output.
    fn putchar(&mut self, byte: u8);

    /// Read one byte from standard input; `None` at end of input.
    fn getchar(&mut self) -> Option<u8>;

    /// Flush buffered output. Called by the shell before each prompt.
    fn flush(&mut self) {}
}

/// Process standard I/O.
#[derive(Debug, Default, Clone, Copy)]
pub struct Stdio;

impl HostIo for Stdio {
    fn write(&mut self, fd: Word, bytes: &[u8]) -> Result<usize, HostError> {
        let result = match fd {
            1 => std::io::stdout().write_all(bytes),
            2 => std::io::stderr().write_all(bytes),
            _ => return Err(HostError::BadFd),
        };

        result.map(|()| bytes.len()).map_err(|_| HostError::Io)
    }

    fn putchar(&mut self, byte: u8) {
        let _ = std::io::stdout().write_all(&[byte]);
    }

    fn getchar(&mut self) -> Option<u8> {
        let mut byte = [0u8; 1];
        match std::io::stdin().read(&mut byte) {
            Ok(1) => Some(byte[0]),
            _ => None,
        }
    }

    fn flush(&mut self) {
        let _ = std::io::stdout().flush();
    }
}

/// In-memory host I/O for tests: output is captured, input is scripted.
#[cfg(any(test, feature = "test-helpers"))]
#[derive(Debug, Default, Clone)]
pub struct CapturedIo {
    output: Vec<u8>,
    input: std::collections::VecDeque<u8>,
}

#[cfg(any(test, feature = "test-helpers"))]
impl CapturedIo {
    /// Empty output, scripted input.
    pub fn with_input(input: impl AsRef<[u8]>) -> Self {
        Self {
            output: Vec::new(),
            input: input.as_ref().iter().copied().collect(),
        }
    }

    /// Everything the guest wrote so far, fds interleaved.
    pub fn output(&self) -> &[u8] {
        &self.output
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl HostIo for CapturedIo {
    fn write(&mut self, fd: Word, bytes: &[u8]) -> Result<usize, HostError> {
        match fd {
            1 | 2 => {
                self.output.extend_from_slice(bytes);
                Ok(bytes.len())
            }
            _ => Err(HostError::BadFd),
        }
    }

    fn putchar(&mut self, byte: u8) {
        self.output.push(byte);
    }

    fn getchar(&mut self) -> Option<u8> {
        self.input.pop_front()
    }
}

impl<H> Interpreter<H>
where
    H: HostIo,
{
    pub(crate) fn syscall(&mut self) -> Result<ExecuteState, VmError> {
        let number = self.registers[0];

        tracing::trace!(number, "syscall");

        let result = match number {
            SYS_ALLOC => self.allocator.alloc(self.registers[1]),

            SYS_FREE => {
                if self.allocator.free(self.registers[1]) {
                    E_OK
                } else {
                    E_INVALID
                }
            }

            SYS_REALLOC => self.allocator.realloc(self.registers[1], self.registers[2]),

            SYS_WRITE => {
                let fd = self.registers[1];
                let len = self.registers[3] as usize;
                let bytes = self.memory.read_bytes(self.registers[2], len)?;

                match self.host.write(fd, bytes) {
                    Ok(written) => written as Word,
                    Err(err) => err.code(),
                }
            }

            SYS_EXIT => {
                let code = self.registers[1];

                tracing::debug!(code, "guest exit");

                self.registers[0] = code;
                self.exit_code = Some(code);
                self.halted = true;

                return Ok(ExecuteState::Halted);
            }

            SYS_PRINT => {
                let len = self.registers[2] as usize;
                let bytes = self.memory.read_bytes(self.registers[1], len)?;

                match self.host.write(1, bytes) {
                    Ok(_) => len as Word,
                    Err(err) => err.code(),
                }
            }

            SYS_PUTCHAR => {
                self.host.putchar(self.registers[1] as u8);
                1
            }

            SYS_GETCHAR => match self.host.getchar() {
                Some(byte) => byte as Word,
                None => Word::MAX,
            },

            _ => {
                tracing::debug!(number, "unimplemented syscall");
                E_NOSYS
            }
        };

        self.registers[0] = result;

        Ok(ExecuteState::Proceed)
    }
}
