//! Session core for the SnapBoard collaborative whiteboard.
//!
//! This crate owns everything that happens between a pointer event and a
//! persist intent: the in-memory mirror of the shared element collection,
//! z-order bookkeeping, and the drag/resize gesture state machine. It is
//! synchronous and does no I/O. The host wires input events and remote
//! snapshots in, and performs the returned [`session::Action`]s against the
//! document store; persistence failures never roll local state back.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`session`] | Per-board session facade and persist intents |
//! | [`element`] | Element model, payload variants, snapshot parsing |
//! | [`doc`] | In-memory element store |
//! | [`stack`] | Z-order promotion and normalization |
//! | [`input`] | Pointer samples and the gesture state machine |
//! | [`arrange`] | Row layout for grouped elements |
//! | [`color`] | Hex parsing and foreground contrast |
//! | [`consts`] | Shared numeric constants (floors, ceiling, defaults) |

pub mod arrange;
pub mod color;
pub mod consts;
pub mod doc;
pub mod element;
pub mod input;
pub mod session;
pub mod stack;
