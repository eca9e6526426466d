//! Ordered implementation registry.
//!
//! A registry wraps a static, ordered list of implementations. Ids handed out
//! by the registry index the *supported* subset in registration order, so id
//! 0 is always the first entry whose capability check passes.

use platform::Caps;

use crate::cache::OnceCache;

/// Upper bound on registered implementations per registry.
pub const MAX_IMPLEMENTATIONS: usize = 16;

/// One selectable implementation of an algorithm.
pub trait Implementation: Sync + 'static {
  /// Short identifier, unique within its registry (e.g. `"sse41"`).
  fn name(&self) -> &'static str;

  /// CPU features the implementation executes.
  fn required_caps(&self) -> Caps;

  /// Whether this process may run the implementation.
  #[inline]
  fn is_supported(&self) -> bool {
    platform::caps().has(self.required_caps())
  }
}

/// Positions of supported entries within the registration list.
#[derive(Clone, Copy, Debug)]
struct Supported {
  slots: [u8; MAX_IMPLEMENTATIONS],
  len: u8,
}

impl Supported {
  fn scan<T: Implementation>(entries: &[T]) -> Self {
    let mut set = Self { slots: [0; MAX_IMPLEMENTATIONS], len: 0 };
    for (index, entry) in entries.iter().enumerate().take(MAX_IMPLEMENTATIONS) {
      if !entry.is_supported() {
        continue;
      }
      if let (Some(slot), Ok(index)) = (set.slots.get_mut(usize::from(set.len)), u8::try_from(index)) {
        *slot = index;
        set.len += 1;
      }
    }
    set
  }

  #[inline]
  fn as_slice(&self) -> &[u8] {
    self.slots.get(..usize::from(self.len)).unwrap_or(&[])
  }
}

/// A static list of implementations, filtered lazily by support.
pub struct Registry<T: 'static> {
  entries: &'static [T],
  supported: OnceCache<Supported>,
}

impl<T: Implementation> Registry<T> {
  /// Wrap `entries`. Only the first [`MAX_IMPLEMENTATIONS`] are considered.
  #[must_use]
  pub const fn new(entries: &'static [T]) -> Self {
    Self { entries, supported: OnceCache::new() }
  }

  /// Every registered implementation, supported or not.
  #[inline]
  #[must_use]
  pub fn entries(&self) -> &'static [T] {
    self.entries
  }

  #[inline]
  fn supported(&self) -> Supported {
    self.supported.get_or_init(|| Supported::scan(self.entries))
  }

  /// Number of implementations this process can run.
  ///
  /// Capability checks are assumed stable for the life of the process, so the
  /// scan happens once.
  #[inline]
  #[must_use]
  pub fn count_supported(&self) -> u32 {
    u32::from(self.supported().len)
  }

  /// The `id`-th supported implementation.
  #[must_use]
  pub fn get(&self, id: u32) -> Option<&'static T> {
    let supported = self.supported();
    let slot = usize::try_from(id).ok()?;
    let index = *supported.as_slice().get(slot)?;
    self.entries.get(usize::from(index))
  }

  /// Id of the supported implementation called `name`.
  #[must_use]
  pub fn position(&self, name: &str) -> Option<u32> {
    self.iter().find(|(_, entry)| entry.name() == name).map(|(id, _)| id)
  }

  /// Supported implementations paired with their ids.
  pub fn iter(&self) -> impl Iterator<Item = (u32, &'static T)> + '_ {
    (0..self.count_supported()).filter_map(|id| self.get(id).map(|entry| (id, entry)))
  }
}

impl<T: 'static> core::fmt::Debug for Registry<T> {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("Registry").field("registered", &self.entries.len()).finish_non_exhaustive()
  }
}
