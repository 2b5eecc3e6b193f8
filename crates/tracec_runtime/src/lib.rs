//! The Trace runtime: observed-value cells, dynamic lists, dynamic strings,
//! and the handful of free functions (`print_f64`) a compiled program links
//! against.
//!
//! Every public function in [`cell`], [`list`], [`string`], and [`print`] is
//! `#[no_mangle] extern "C"` and forms the stable ABI a generated LIR module
//! declares as external symbols. None of them panics across the boundary —
//! a null pointer or an out-of-range index degrades to a diagnostic plus a
//! safe default rather than aborting the process.

pub mod cell;
pub mod emit;
pub mod list;
pub mod print;
pub mod string;

pub use cell::Cell;
pub use list::List;
pub use print::{format_display, print_f64};
pub use string::TraceString;
