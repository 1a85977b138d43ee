//! File actions module.
//!
//! The only filesystem mutations a run performs live here:
//! - Removing redundant copies (permanent delete or system trash)
//! - Moving kept files into the destination folder with collision-safe
//!   renaming
//!
//! ```no_run
//! use pdfdedupe::actions::{Relocator, RemovalMode};
//!
//! let relocator = Relocator::new("final_pdfs").with_removal_mode(RemovalMode::Trash);
//! ```

pub mod relocate;

pub use relocate::{suffixed_name, RelocateError, Relocator, RemovalMode};
