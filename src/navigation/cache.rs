//! Caches of computed paths, flow fields and line of sight fields.
//!
//! Readers never block on a computation. Asking for a missing key records it
//! as [CacheState::Pending] and queues it, the requests are later drained and
//! computed in parallel on the [ComputeTaskPool] before being published as
//! [CacheState::Ready]. Any number of readers asking for the same key while
//! it is pending share the one computation.
//!
//! Each cache holds a bounded number of entries, the oldest entry is evicted
//! first once the bound is exceeded.
//!

use std::collections::{HashMap, HashSet, VecDeque};
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::prelude::*;
use bevy::prelude::*;
use bevy::tasks::{ComputeTaskPool, TaskPool};

/// State of a cache entry
#[derive(Debug)]
pub enum CacheState<V> {
	/// Requested and waiting to be computed
	Pending,
	/// Computed and shared with every reader
	Ready(Arc<V>),
}

impl<V> Clone for CacheState<V> {
	fn clone(&self) -> Self {
		match self {
			CacheState::Pending => CacheState::Pending,
			CacheState::Ready(value) => CacheState::Ready(Arc::clone(value)),
		}
	}
}

impl<V> CacheState<V> {
	pub fn is_pending(&self) -> bool {
		matches!(self, CacheState::Pending)
	}
	/// The value when ready
	pub fn ready(&self) -> Option<&Arc<V>> {
		match self {
			CacheState::Pending => None,
			CacheState::Ready(value) => Some(value),
		}
	}
}

/// Key of a cached path, paths are shared by every actor standing in the
/// same region and heading for the same cell
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Reflect)]
pub struct PathKey {
	/// Travel type of the actors
	travel_type: usize,
	/// Region the actors stand in
	source: RegionKey,
	/// Destination cell
	target: GridCell,
}

impl PathKey {
	/// Create a new instance of [PathKey]
	pub fn new(travel_type: usize, source: RegionKey, target: GridCell) -> Self {
		PathKey {
			travel_type,
			source,
			target,
		}
	}
	pub fn get_travel_type(&self) -> usize {
		self.travel_type
	}
	pub fn get_source(&self) -> RegionKey {
		self.source
	}
	pub fn get_target(&self) -> GridCell {
		self.target
	}
}

/// Key of a cached [FlowField]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Reflect)]
pub struct FlowKey {
	/// Sector the field covers
	sector: SectorID,
	/// Travel type the field was computed for
	travel_type: usize,
	/// Goal cells
	goal: FieldRect,
	/// Side the field leads out through
	exit: Option<Ordinal>,
}

impl FlowKey {
	/// Create a new instance of [FlowKey]
	pub fn new(sector: SectorID, travel_type: usize, goal: FieldRect, exit: Option<Ordinal>) -> Self {
		FlowKey {
			sector,
			travel_type,
			goal,
			exit,
		}
	}
	/// The key of the field leading to a path waypoint
	pub fn from_node(travel_type: usize, node: &PortalPathNode) -> Self {
		FlowKey::new(
			node.get_sector(),
			travel_type,
			node.get_goal_bounds(),
			node.get_exit_direction(),
		)
	}
	pub fn get_sector(&self) -> SectorID {
		self.sector
	}
	pub fn get_travel_type(&self) -> usize {
		self.travel_type
	}
	pub fn get_goal(&self) -> FieldRect {
		self.goal
	}
	pub fn get_exit(&self) -> Option<Ordinal> {
		self.exit
	}
}

/// Key of a cached [LosField]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Reflect)]
pub struct LosKey {
	/// Sector the field covers
	sector: SectorID,
	/// Travel type the field was computed for
	travel_type: usize,
	/// Cell sight is measured to
	target: FieldCell,
}

impl LosKey {
	/// Create a new instance of [LosKey]
	pub fn new(sector: SectorID, travel_type: usize, target: FieldCell) -> Self {
		LosKey {
			sector,
			travel_type,
			target,
		}
	}
	pub fn get_sector(&self) -> SectorID {
		self.sector
	}
	pub fn get_travel_type(&self) -> usize {
		self.travel_type
	}
	pub fn get_target(&self) -> FieldCell {
		self.target
	}
}

/// Contents of a [ResultCache] guarded by its lock
struct CacheInner<K, V> {
	/// Every known entry
	entries: HashMap<K, CacheState<V>>,
	/// Insertion order of the entries, oldest first
	order: VecDeque<K>,
	/// Keys waiting to be computed
	requests: VecDeque<K>,
}

/// A bounded map of keys to [CacheState]s shared between readers and the
/// worker computing requests
pub struct ResultCache<K, V> {
	/// Entries and queues
	inner: Mutex<CacheInner<K, V>>,
	/// Maximum entries held
	capacity: usize,
}

impl<K, V> ResultCache<K, V>
where
	K: Eq + Hash + Clone + std::fmt::Debug + Send + Sync + 'static,
	V: Send + Sync + 'static,
{
	/// Create a cache holding at most `capacity` entries
	pub fn new(capacity: usize) -> Self {
		ResultCache {
			inner: Mutex::new(CacheInner {
				entries: HashMap::new(),
				order: VecDeque::new(),
				requests: VecDeque::new(),
			}),
			capacity: capacity.max(1),
		}
	}
	/// Acquire the lock, a panic in another holder leaves the data usable
	fn lock(&self) -> MutexGuard<'_, CacheInner<K, V>> {
		self.inner.lock().unwrap_or_else(PoisonError::into_inner)
	}
	/// Look up `key`, queueing a request for it when it is unknown
	pub fn get_or_request(&self, key: &K) -> CacheState<V> {
		let mut inner = self.lock();
		if let Some(state) = inner.entries.get(key) {
			return state.clone();
		}
		inner.entries.insert(key.clone(), CacheState::Pending);
		inner.order.push_back(key.clone());
		inner.requests.push_back(key.clone());
		while inner.entries.len() > self.capacity {
			match inner.order.pop_front() {
				Some(oldest) => {
					inner.entries.remove(&oldest);
					inner.requests.retain(|k| k != &oldest);
				}
				None => break,
			}
		}
		CacheState::Pending
	}
	/// Look up `key` without requesting it
	pub fn get(&self, key: &K) -> Option<CacheState<V>> {
		self.lock().entries.get(key).cloned()
	}
	/// Drain the queued requests that are still pending, each key at most
	/// once
	pub fn take_requests(&self) -> Vec<K> {
		let mut inner = self.lock();
		let requests = std::mem::take(&mut inner.requests);
		let mut taken = HashSet::new();
		requests
			.into_iter()
			.filter(|key| inner.entries.get(key).is_some_and(|s| s.is_pending()))
			.filter(|key| taken.insert(key.clone()))
			.collect()
	}
	/// Publish the result of a request. The result is discarded when the
	/// entry was evicted or invalidated while being computed
	pub fn complete(&self, key: K, value: V) -> bool {
		let mut inner = self.lock();
		match inner.entries.get_mut(&key) {
			Some(state) if state.is_pending() => {
				*state = CacheState::Ready(Arc::new(value));
				true
			}
			_ => {
				trace!("Discarded result of {:?}", key);
				false
			}
		}
	}
	/// Remove an entry, the next read requests it again
	pub fn invalidate(&self, key: &K) -> bool {
		let mut inner = self.lock();
		let removed = inner.entries.remove(key).is_some();
		if removed {
			inner.order.retain(|k| k != key);
			inner.requests.retain(|k| k != key);
		}
		removed
	}
	/// Keep only the entries for which `keep` returns true
	pub fn retain(&self, mut keep: impl FnMut(&K, &CacheState<V>) -> bool) -> usize {
		let mut inner = self.lock();
		let before = inner.entries.len();
		inner.entries.retain(|k, state| keep(k, state));
		let CacheInner {
			entries,
			order,
			requests,
		} = &mut *inner;
		order.retain(|k| entries.contains_key(k));
		requests.retain(|k| entries.contains_key(k));
		before - entries.len()
	}
	/// Remove every entry and request
	pub fn clear(&self) {
		let mut inner = self.lock();
		inner.entries.clear();
		inner.order.clear();
		inner.requests.clear();
	}
	pub fn len(&self) -> usize {
		self.lock().entries.len()
	}
	pub fn is_empty(&self) -> bool {
		self.lock().entries.is_empty()
	}
	pub fn get_capacity(&self) -> usize {
		self.capacity
	}
	/// Number of entries waiting to be computed
	pub fn get_pending_count(&self) -> usize {
		self.lock()
			.entries
			.values()
			.filter(|s| s.is_pending())
			.count()
	}
	/// Compute every queued request in parallel and publish the results,
	/// returns how many results were published
	pub fn process(&self, compute: impl Fn(&K) -> V + Sync) -> usize {
		let requests = self.take_requests();
		if requests.is_empty() {
			return 0;
		}
		let compute = &compute;
		let results = ComputeTaskPool::get_or_init(TaskPool::default).scope(|scope| {
			for key in requests {
				scope.spawn(async move {
					let value = compute(&key);
					(key, value)
				});
			}
		});
		let mut published = 0;
		for (key, value) in results {
			if self.complete(key, value) {
				published += 1;
			}
		}
		published
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::atomic::{AtomicUsize, Ordering};

	#[test]
	fn first_read_is_pending() {
		let cache: ResultCache<u32, u32> = ResultCache::new(8);
		assert!(cache.get_or_request(&1).is_pending());
		assert!(cache.get_or_request(&1).is_pending());
		assert_eq!(vec![1], cache.take_requests());
		assert!(cache.take_requests().is_empty());
		assert!(cache.complete(1, 10));
		let state = cache.get_or_request(&1);
		assert_eq!(Some(&10), state.ready().map(|v| v.as_ref()));
	}
	#[test]
	fn complete_after_invalidate_is_discarded() {
		let cache: ResultCache<u32, u32> = ResultCache::new(8);
		cache.get_or_request(&1);
		assert!(cache.invalidate(&1));
		assert!(!cache.complete(1, 10));
		assert!(cache.get(&1).is_none());
	}
	#[test]
	fn oldest_entry_evicted() {
		let cache: ResultCache<u32, u32> = ResultCache::new(2);
		cache.get_or_request(&1);
		cache.get_or_request(&2);
		cache.get_or_request(&3);
		assert_eq!(2, cache.len());
		assert!(cache.get(&1).is_none());
		assert!(cache.get(&3).is_some());
		// the evicted request is no longer computed
		assert_eq!(vec![2, 3], cache.take_requests());
	}
	#[test]
	fn retain_prunes_order() {
		let cache: ResultCache<u32, u32> = ResultCache::new(2);
		cache.get_or_request(&1);
		cache.get_or_request(&2);
		assert_eq!(1, cache.retain(|k, _| *k != 1));
		cache.get_or_request(&3);
		// 2 is now the oldest
		cache.get_or_request(&4);
		assert!(cache.get(&2).is_none());
		assert!(cache.get(&3).is_some());
	}
	#[test]
	fn process_publishes_results() {
		let cache: ResultCache<u32, u32> = ResultCache::new(16);
		for key in 0..10 {
			cache.get_or_request(&key);
		}
		assert_eq!(10, cache.process(|k| k * 2));
		for key in 0..10 {
			let state = cache.get_or_request(&key);
			assert_eq!(Some(&(key * 2)), state.ready().map(|v| v.as_ref()));
		}
		assert_eq!(0, cache.get_pending_count());
	}
	#[test]
	fn concurrent_requests_compute_once() {
		let cache: ResultCache<u32, u32> = ResultCache::new(16);
		std::thread::scope(|s| {
			for _ in 0..8 {
				s.spawn(|| {
					for _ in 0..100 {
						cache.get_or_request(&7);
					}
				});
			}
		});
		let computations = AtomicUsize::new(0);
		cache.process(|k| {
			computations.fetch_add(1, Ordering::SeqCst);
			*k
		});
		assert_eq!(1, computations.load(Ordering::SeqCst));
		assert!(cache.get_or_request(&7).ready().is_some());
	}
	#[test]
	fn evicted_then_requested_again_computes_once() {
		let cache: ResultCache<u32, u32> = ResultCache::new(1);
		cache.get_or_request(&1);
		// evicts 1 while its request is still queued
		cache.get_or_request(&2);
		cache.get_or_request(&1);
		assert_eq!(vec![1], cache.take_requests());
		let cache: ResultCache<u32, u32> = ResultCache::new(1);
		cache.get_or_request(&1);
		cache.get_or_request(&2);
		cache.get_or_request(&1);
		let computations = AtomicUsize::new(0);
		let published = cache.process(|k| {
			computations.fetch_add(1, Ordering::SeqCst);
			*k * 10
		});
		assert_eq!(1, published);
		assert_eq!(1, computations.load(Ordering::SeqCst));
		assert_eq!(10, **cache.get_or_request(&1).ready().unwrap());
	}
	#[test]
	fn invalidated_then_requested_again_computes_once() {
		let cache: ResultCache<u32, u32> = ResultCache::new(8);
		cache.get_or_request(&1);
		assert!(cache.invalidate(&1));
		cache.get_or_request(&1);
		let computations = AtomicUsize::new(0);
		let published = cache.process(|k| {
			computations.fetch_add(1, Ordering::SeqCst);
			*k * 10
		});
		assert_eq!(1, published);
		assert_eq!(1, computations.load(Ordering::SeqCst));
		assert!(cache.take_requests().is_empty());
	}
	#[test]
	fn retained_requests_follow_their_entries() {
		let cache: ResultCache<u32, u32> = ResultCache::new(8);
		for key in 0..4 {
			cache.get_or_request(&key);
		}
		assert_eq!(2, cache.retain(|k, _| k % 2 == 0));
		assert_eq!(vec![0, 2], cache.take_requests());
	}
}
