//! In-process request governor guarding the expensive rendering paths.
//!
//! Sliding-window-by-reset semantics: each client key owns a `(count, window start)` pair
//! that resets once the window elapses and rejects with the time remaining otherwise. The
//! counter map is process-local; running N instances multiplies the effective limit by N,
//! which is accepted as best-effort control. [`RateGovernor`] is a trait so deployments that
//! outgrow a single instance can inject a shared-cache governor without touching the
//! orchestrator.

// self
use crate::_prelude::*;

/// Client identity a request is counted against.
///
/// Derived from the origin network address; see [`ClientKey::from_forwarded`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ClientKey(String);
impl ClientKey {
	/// Wraps an already-derived key (tests, custom derivations).
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Derives the key from a forwarded-address chain, falling back to the raw connection
	/// address.
	///
	/// `forwarded` is the `X-Forwarded-For` value as received; only the first (client-most)
	/// entry counts. Blank chains fall through to `remote`.
	pub fn from_forwarded(forwarded: Option<&str>, remote: &str) -> Self {
		let first = forwarded
			.and_then(|chain| chain.split(',').next())
			.map(str::trim)
			.filter(|entry| !entry.is_empty());

		Self(first.unwrap_or_else(|| remote.trim()).to_owned())
	}
}
impl Display for ClientKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

/// Admission budget for one endpoint: at most `limit` requests per `window`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RatePolicy {
	/// Requests admitted per window.
	pub limit: u32,
	/// Window length.
	pub window: Duration,
}
impl RatePolicy {
	/// Policy admitting `limit` requests per minute.
	pub const fn per_minute(limit: u32) -> Self {
		Self { limit, window: Duration::minutes(1) }
	}
}

/// Result of an admission check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RateDecision {
	/// The request may proceed.
	Admitted,
	/// The request is over budget.
	Rejected {
		/// Time remaining until the caller's window resets; positive and at most the
		/// policy window.
		retry_after: Duration,
	},
}
impl RateDecision {
	/// Whether the request was admitted.
	pub fn is_admitted(&self) -> bool {
		matches!(self, RateDecision::Admitted)
	}
}

/// Admission-control contract consulted before every pipeline entry point.
///
/// Implementations own their counter storage exclusively; no other component reads or
/// writes it. `admit_at` is the deterministic-clock seam for tests.
pub trait RateGovernor
where
	Self: Send + Sync,
{
	/// Checks and counts one request for `key`, treating `now` as the current instant.
	fn admit_at(&self, key: &ClientKey, policy: RatePolicy, now: OffsetDateTime) -> RateDecision;

	/// Checks and counts one request for `key` against the wall clock.
	fn admit(&self, key: &ClientKey, policy: RatePolicy) -> RateDecision {
		self.admit_at(key, policy, OffsetDateTime::now_utc())
	}
}

#[derive(Clone, Copy, Debug)]
struct RateWindow {
	count: u32,
	window_start: OffsetDateTime,
}

/// Process-local governor keeping per-client windows in a lock-guarded map.
///
/// A single mutual-exclusion domain covers check and increment, so two concurrent requests
/// from one client can never both observe `count < limit` when only one slot remains.
#[derive(Debug, Default)]
pub struct MemoryGovernor(Mutex<HashMap<ClientKey, RateWindow>>);
impl RateGovernor for MemoryGovernor {
	fn admit_at(&self, key: &ClientKey, policy: RatePolicy, now: OffsetDateTime) -> RateDecision {
		let mut guard = self.0.lock();
		let window = guard
			.entry(key.clone())
			.or_insert(RateWindow { count: 0, window_start: now });

		if now - window.window_start >= policy.window {
			window.count = 0;
			window.window_start = now;
		}
		if window.count >= policy.limit {
			return RateDecision::Rejected {
				retry_after: policy.window - (now - window.window_start),
			};
		}

		window.count += 1;

		RateDecision::Admitted
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::{Arc, atomic::{AtomicU32, Ordering}};
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;

	const WINDOW_START: OffsetDateTime = datetime!(2026-02-20 10:00 UTC);

	#[test]
	fn admits_exactly_limit_within_window() {
		let governor = MemoryGovernor::default();
		let key = ClientKey::new("198.51.100.4");
		let policy = RatePolicy { limit: 10, window: Duration::milliseconds(60_000) };

		for n in 0..10 {
			assert!(
				governor.admit_at(&key, policy, WINDOW_START).is_admitted(),
				"Request {n} should be admitted.",
			);
		}

		match governor.admit_at(&key, policy, WINDOW_START + Duration::seconds(5)) {
			RateDecision::Rejected { retry_after } => {
				assert!(retry_after.is_positive());
				assert!(retry_after <= policy.window);
			},
			RateDecision::Admitted => panic!("The eleventh request should be rejected."),
		}
	}

	#[test]
	fn window_elapse_resets_admission() {
		let governor = MemoryGovernor::default();
		let key = ClientKey::new("198.51.100.4");
		let policy = RatePolicy::per_minute(2);

		assert!(governor.admit_at(&key, policy, WINDOW_START).is_admitted());
		assert!(governor.admit_at(&key, policy, WINDOW_START).is_admitted());
		assert!(!governor.admit_at(&key, policy, WINDOW_START).is_admitted());
		assert!(
			governor.admit_at(&key, policy, WINDOW_START + Duration::minutes(1)).is_admitted(),
			"Admission should reset once the window elapses.",
		);
	}

	#[test]
	fn distinct_keys_count_independently() {
		let governor = MemoryGovernor::default();
		let policy = RatePolicy::per_minute(1);

		assert!(governor.admit_at(&ClientKey::new("a"), policy, WINDOW_START).is_admitted());
		assert!(governor.admit_at(&ClientKey::new("b"), policy, WINDOW_START).is_admitted());
		assert!(!governor.admit_at(&ClientKey::new("a"), policy, WINDOW_START).is_admitted());
	}

	#[test]
	fn concurrent_same_key_requests_never_over_admit() {
		let governor = Arc::new(MemoryGovernor::default());
		let policy = RatePolicy::per_minute(16);
		let admitted = Arc::new(AtomicU32::new(0));
		let handles: Vec<_> = (0..4)
			.map(|_| {
				let governor = governor.clone();
				let admitted = admitted.clone();

				std::thread::spawn(move || {
					let key = ClientKey::new("shared");

					for _ in 0..16 {
						if governor.admit_at(&key, policy, WINDOW_START).is_admitted() {
							admitted.fetch_add(1, Ordering::SeqCst);
						}
					}
				})
			})
			.collect();

		for handle in handles {
			handle.join().expect("Contending thread should not panic.");
		}

		assert_eq!(admitted.load(Ordering::SeqCst), 16);
	}

	#[test]
	fn client_key_prefers_first_forwarded_entry() {
		assert_eq!(
			ClientKey::from_forwarded(Some("203.0.113.7, 70.41.3.18"), "10.0.0.1"),
			ClientKey::new("203.0.113.7"),
		);
		assert_eq!(ClientKey::from_forwarded(Some("  "), "10.0.0.1"), ClientKey::new("10.0.0.1"));
		assert_eq!(ClientKey::from_forwarded(None, "10.0.0.1"), ClientKey::new("10.0.0.1"));
	}
}
