//! Debugger shell for the BURST virtual machine.
//!
//! The shell consumes whitespace-delimited command lines ([`Command`]),
//! executes them against a [`Session`] owning the machine and the
//! loaded symbol table, and returns the text to show. Line editing,
//! completion and paging belong to the surrounding terminal layer, not
//! to this crate.

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(unused_must_use)]

mod command;
mod expr;
mod session;

pub use command::{Command, InfoTarget};
pub use session::{Outcome, Session, SessionError};
