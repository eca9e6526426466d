//! Runtime implementation selection.
//!
//! Algorithm crates describe each implementation once, put them in a static
//! [`Registry`], and route calls through a [`Selector`]:
//!
//! ```
//! use backend::{Choice, Implementation, Registry, Selector};
//! use platform::Caps;
//!
//! struct Imp(&'static str);
//!
//! impl Implementation for Imp {
//!   fn name(&self) -> &'static str {
//!     self.0
//!   }
//!   fn required_caps(&self) -> Caps {
//!     Caps::NONE
//!   }
//! }
//!
//! static IMPLS: [Imp; 2] = [Imp("portable"), Imp("also-portable")];
//! static REGISTRY: Registry<Imp> = Registry::new(&IMPLS);
//! static SELECTOR: Selector<Imp> = Selector::new(&REGISTRY);
//!
//! SELECTOR.select_by_id(Choice::Index(1));
//! assert_eq!(SELECTOR.current_ops().name(), "also-portable");
//! ```
//!
//! Support is decided by [`platform::caps()`] unless an implementation
//! overrides [`Implementation::is_supported`].
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::indexing_slicing))]
#![no_std]

#[cfg(feature = "std")]
extern crate std;

pub mod cache;
mod error;
pub mod registry;
pub mod selector;

pub use cache::OnceCache;
pub use error::SelectError;
pub use platform;
pub use registry::{Implementation, MAX_IMPLEMENTATIONS, Registry};
pub use selector::{Choice, Mode, Selector};
