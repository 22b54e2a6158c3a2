//! BURST virtual machine implementation
//!
//! A single-threaded, purely synchronous interpreter for the BURST
//! instruction set: flat bounds-checked memory, sixteen general
//! registers plus `pc`/`sp`, condition flags, a first-fit heap
//! allocator serviced through syscalls, and an in-machine debugger with
//! breakpoints and watchpoints.
//!
//! One logical owner drives the machine; no operation suspends. Fatal
//! traps halt the machine and surface as [`error::VmError`].

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(unused_must_use)]

pub mod consts;
pub mod error;
pub mod interpreter;
pub mod state;

pub mod prelude {
    //! Re-exports of the commonly used machine surface.

    #[doc(no_inline)]
    pub use burst_asm::{Flags, Instruction, Opcode, RegisterId, Word};

    pub use crate::consts::{HEAP_BASE, MEM_SIZE, VM_REGISTER_COUNT, WORD_SIZE};
    pub use crate::error::VmError;
    pub use crate::interpreter::{
        Allocator, FreeBlock, HostError, HostIo, Interpreter, Memory, Stdio,
    };
    pub use crate::state::{Debugger, ExecuteState, StopReason};

    #[cfg(any(test, feature = "test-helpers"))]
    pub use crate::interpreter::CapturedIo;

    pub use crate::interpreter::syscall::{
        E_BADFD, E_INVALID, E_IO, E_NOMEM, E_NOSYS, E_NOTFOUND, E_OK, E_PERM, SYS_ALLOC,
        SYS_EXIT, SYS_FREE, SYS_GETCHAR, SYS_PRINT, SYS_PUTCHAR, SYS_REALLOC, SYS_WRITE,
    };
}
