//! Process-wide implementation selection.
//!
//! A [`Selector`] tracks which entry of a [`Registry`] is active and how that
//! choice is maintained:
//!
//! | mode      | meaning |
//! |-----------|---------|
//! | `Fastest` | use the id recorded by [`Selector::record_fastest`] (0 until calibrated) |
//! | `Cycle`   | every [`Selector::dispatch_ops`] advances round-robin first |
//! | `User`    | an explicit name was chosen |
//! | `Pending` | names are recorded, not applied, until [`Selector::resolve_deferred`] |
//!
//! All state lives in independent atomics. A reader always observes a valid
//! supported id; concurrent writers resolve last-write-wins.

use core::sync::atomic::{AtomicU8, AtomicU32, Ordering};

use crate::error::SelectError;
use crate::registry::{Implementation, Registry};

const NO_PENDING: u32 = u32::MAX;

/// How the active implementation is maintained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Mode {
  Fastest = 0,
  Cycle = 1,
  User = 2,
  Pending = 3,
}

impl Mode {
  #[inline]
  const fn from_u8(raw: u8) -> Self {
    match raw {
      1 => Self::Cycle,
      2 => Self::User,
      3 => Self::Pending,
      _ => Self::Fastest,
    }
  }

  #[must_use]
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Fastest => "fastest",
      Self::Cycle => "cycle",
      Self::User => "user",
      Self::Pending => "pending",
    }
  }
}

/// Argument to [`Selector::select_by_id`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Choice {
  /// The recorded fastest id.
  Fastest,
  /// One round-robin step.
  Cycle,
  /// A concrete id into the supported subset.
  Index(u32),
}

/// Active-implementation state over a static registry.
pub struct Selector<T: 'static> {
  registry: &'static Registry<T>,
  mode: AtomicU8,
  current: AtomicU32,
  fastest: AtomicU32,
  pending: AtomicU32,
}

impl<T: Implementation> Selector<T> {
  /// A selector in `Fastest` mode pointing at id 0.
  #[must_use]
  pub const fn new(registry: &'static Registry<T>) -> Self {
    Self::with_mode(registry, Mode::Fastest)
  }

  /// A selector that records name selections until
  /// [`resolve_deferred`](Self::resolve_deferred) runs.
  #[must_use]
  pub const fn deferred(registry: &'static Registry<T>) -> Self {
    Self::with_mode(registry, Mode::Pending)
  }

  const fn with_mode(registry: &'static Registry<T>, mode: Mode) -> Self {
    Self {
      registry,
      mode: AtomicU8::new(mode as u8),
      current: AtomicU32::new(0),
      fastest: AtomicU32::new(0),
      pending: AtomicU32::new(NO_PENDING),
    }
  }

  #[inline]
  #[must_use]
  pub fn registry(&self) -> &'static Registry<T> {
    self.registry
  }

  #[inline]
  #[must_use]
  pub fn mode(&self) -> Mode {
    Mode::from_u8(self.mode.load(Ordering::Acquire))
  }

  #[inline]
  fn set_mode(&self, mode: Mode) {
    if mode != Mode::Pending {
      self.pending.store(NO_PENDING, Ordering::Relaxed);
    }
    self.mode.store(mode as u8, Ordering::Release);
  }

  #[inline]
  #[must_use]
  pub fn count_supported(&self) -> u32 {
    self.registry.count_supported()
  }

  /// Id of the active implementation.
  #[inline]
  #[must_use]
  pub fn current_id(&self) -> u32 {
    self.current.load(Ordering::Acquire)
  }

  /// Id recorded by the last calibration.
  #[inline]
  #[must_use]
  pub fn fastest_id(&self) -> u32 {
    self.fastest.load(Ordering::Relaxed)
  }

  /// Id waiting for [`resolve_deferred`](Self::resolve_deferred).
  #[must_use]
  pub fn pending_id(&self) -> Option<u32> {
    match self.pending.load(Ordering::Relaxed) {
      NO_PENDING => None,
      id => Some(id),
    }
  }

  /// Change the active implementation.
  ///
  /// The mode is left as it is. An out-of-range [`Choice::Index`] is ignored;
  /// callers validate against [`count_supported`](Self::count_supported).
  pub fn select_by_id(&self, choice: Choice) {
    let count = self.count_supported();
    match choice {
      Choice::Fastest => {
        let fastest = self.fastest_id();
        self.current.store(if fastest < count { fastest } else { 0 }, Ordering::Release);
      }
      Choice::Cycle => {
        self.advance_cycle();
      }
      Choice::Index(id) if id < count => {
        self.current.store(id, Ordering::Release);
      }
      Choice::Index(id) => {
        log::debug!("ignoring implementation id {id}: only {count} supported");
        return;
      }
    }
    log::debug!("selected implementation {} ({})", self.current_id(), self.current_name());
  }

  /// Select by name; `"fastest"` and `"cycle"` switch modes instead.
  ///
  /// In `Pending` mode a matched name is stored for
  /// [`resolve_deferred`](Self::resolve_deferred) rather than applied.
  ///
  /// # Errors
  ///
  /// [`SelectError::NotFound`] when no supported implementation has that
  /// name. Nothing changes in that case.
  pub fn select_by_name(&self, name: &str) -> Result<(), SelectError> {
    match name {
      "fastest" => {
        self.set_mode(Mode::Fastest);
        self.select_by_id(Choice::Fastest);
      }
      "cycle" => {
        self.set_mode(Mode::Cycle);
        self.select_by_id(Choice::Cycle);
      }
      _ => {
        let id = self.registry.position(name).ok_or(SelectError::NotFound)?;
        if self.mode() == Mode::Pending {
          log::debug!("deferring implementation `{name}` until setup");
          self.pending.store(id, Ordering::Relaxed);
        } else {
          self.set_mode(Mode::User);
          self.select_by_id(Choice::Index(id));
        }
      }
    }
    Ok(())
  }

  /// Remember `id` as the fastest implementation without selecting it.
  pub fn record_fastest(&self, id: u32) {
    let count = self.count_supported();
    if id >= count {
      log::warn!("ignoring fastest implementation id {id}: only {count} supported");
      return;
    }
    self.fastest.store(id, Ordering::Relaxed);
  }

  /// Turn the configured mode into a concrete selection.
  ///
  /// Leaves `Pending` mode, applying the recorded name if there is one and
  /// falling back to `Fastest` otherwise. Later calls re-apply the current
  /// mode.
  pub fn resolve_deferred(&self) {
    match self.mode() {
      Mode::Pending => match self.pending.swap(NO_PENDING, Ordering::Relaxed) {
        NO_PENDING => {
          self.set_mode(Mode::Fastest);
          self.select_by_id(Choice::Fastest);
        }
        id => {
          self.set_mode(Mode::User);
          self.select_by_id(Choice::Index(id));
        }
      },
      Mode::Fastest => self.select_by_id(Choice::Fastest),
      Mode::Cycle => self.select_by_id(Choice::Cycle),
      Mode::User => self.select_by_id(Choice::Index(self.current_id())),
    }
  }

  /// Step the active id round-robin and return the new id.
  pub fn advance_cycle(&self) -> u32 {
    let count = self.count_supported().max(1);
    let previous = self
      .current
      .fetch_update(Ordering::AcqRel, Ordering::Acquire, |id| Some((id + 1) % count))
      .unwrap_or_else(|id| id);
    (previous + 1) % count
  }

  /// The active implementation. Never changes state.
  ///
  /// # Panics
  ///
  /// Panics if the registry has no supported entry. Registries must include a
  /// portable fallback.
  #[must_use]
  pub fn current_ops(&self) -> &'static T {
    match self.try_current_ops() {
      Ok(ops) => ops,
      Err(_) => panic!("no supported implementation; the registry must include a portable fallback"),
    }
  }

  /// The active implementation, or [`SelectError::NoSupported`].
  ///
  /// # Errors
  ///
  /// Only when the registry has no supported entry at all.
  pub fn try_current_ops(&self) -> Result<&'static T, SelectError> {
    self
      .registry
      .get(self.current_id())
      .or_else(|| self.registry.get(0))
      .ok_or(SelectError::NoSupported)
  }

  /// The implementation to use for one operation.
  ///
  /// In `Cycle` mode this advances first, so a sweep that hashes once per
  /// trial visits every implementation in turn.
  #[inline]
  #[must_use]
  pub fn dispatch_ops(&self) -> &'static T {
    if self.mode() == Mode::Cycle {
      self.advance_cycle();
    }
    self.current_ops()
  }

  fn current_name(&self) -> &'static str {
    self.try_current_ops().map_or("<none>", |ops| ops.name())
  }
}

impl<T: 'static> core::fmt::Debug for Selector<T> {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("Selector")
      .field("mode", &Mode::from_u8(self.mode.load(Ordering::Relaxed)))
      .field("current", &self.current.load(Ordering::Relaxed))
      .field("fastest", &self.fastest.load(Ordering::Relaxed))
      .finish_non_exhaustive()
  }
}
