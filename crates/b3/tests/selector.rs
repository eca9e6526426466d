use b3::{BackendSelector, Choice, Dispatch, Hasher, Mode};
use proptest::prelude::*;

fn local() -> &'static BackendSelector {
  Box::leak(Box::new(BackendSelector::new(b3::registry())))
}

proptest! {
  #[test]
  fn out_of_range_id_leaves_selection(start in 0u32..16, bad in 0u32..1000) {
    let selector = local();
    let count = selector.count_supported();
    let start = start % count;
    selector.select_by_id(Choice::Index(start));

    let bad = count + bad;
    selector.select_by_id(Choice::Index(bad));
    prop_assert_eq!(selector.current_id(), start);
  }

  #[test]
  fn cycle_returns_to_start(start in 0u32..16) {
    let selector = local();
    let start = start % selector.count_supported();
    selector.select_by_id(Choice::Index(start));
    for _ in 0..selector.count_supported() {
      selector.select_by_name("cycle").unwrap();
    }
    prop_assert_eq!(selector.current_id(), start);
  }
}

#[test]
fn cycling_hasher_visits_every_backend_with_same_result() {
  let selector = local();
  selector.select_by_name("cycle").unwrap();
  let start = selector.current_id();

  let data: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
  let expected = b3::hash(&data);
  let count = selector.count_supported();
  let mut hasher = Hasher::new().with_dispatch(Dispatch::Selector(selector));
  for piece in data.chunks(1000) {
    hasher.update(piece);
  }
  assert_eq!(hasher.finalize(), expected);
  // Ten updates and one finalize, one step each.
  assert_eq!(selector.current_id(), (start + 11) % count);
}

#[test]
fn fastest_mode_follows_recorded_id() {
  let selector = local();
  let last = selector.count_supported() - 1;
  selector.record_fastest(last);
  selector.select_by_name("fastest").unwrap();
  assert_eq!(selector.mode(), Mode::Fastest);
  assert_eq!(selector.current_id(), last);

  selector.record_fastest(last + 1);
  assert_eq!(selector.fastest_id(), last);
}

#[test]
fn deferred_selection_applies_on_resolve() {
  let selector: &'static BackendSelector = Box::leak(Box::new(BackendSelector::deferred(b3::registry())));
  selector.select_by_name("generic").unwrap();
  assert_eq!(selector.mode(), Mode::Pending);
  selector.resolve_deferred();
  assert_eq!(selector.mode(), Mode::User);
  assert_eq!(selector.current_ops().name(), "generic");
}

#[test]
fn global_api() {
  let count = b3::supported_backend_count();
  assert!(count >= 1);

  b3::select_backend_by_name("generic").unwrap();
  assert_eq!(b3::active_backend_name(), "generic");
  assert_eq!(b3::active_backend_id(), 0);

  b3::select_backend_by_id(Choice::Index(count));
  assert_eq!(b3::active_backend_id(), 0);

  let err = b3::select_backend_by_name("itanium").unwrap_err();
  assert_eq!(err, b3::Error::BackendNotFound("itanium".into()));
  assert_eq!(b3::active_backend_name(), "generic");

  b3::set_fastest_backend(count - 1);
  b3::select_backend_by_name("fastest").unwrap();
  assert_eq!(b3::active_backend_id(), count - 1);

  b3::apply_deferred_selection();
  assert_eq!(b3::selector().mode(), Mode::Fastest);
  assert_eq!(b3::active_backend_id(), count - 1);

  let names: Vec<&str> = b3::supported_backends().map(|(_, backend)| backend.name()).collect();
  assert_eq!(names.len() as u32, count);
  assert_eq!(names[0], "generic");
}
