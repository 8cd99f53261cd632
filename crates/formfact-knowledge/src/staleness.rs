// SPDX-FileCopyrightText: 2026 Formfact Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Staleness policy guarding verified values against extraction noise.

use chrono::{DateTime, Utc};
use tracing::warn;

/// What to do with a freshly extracted candidate for an already-known field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StalenessDecision {
    /// A recently verified value stands; drop the candidate.
    Skip,
    /// The candidate may be stored as an additional unverified entry.
    Accept,
}

/// Governs whether a freshly extracted fact may challenge a verified one.
///
/// A verified entry younger than the window suppresses new extraction
/// candidates for its field; past the window (or with no verified entry),
/// candidates are stored unverified and may later trigger a conflict.
#[derive(Debug, Clone, Copy)]
pub struct StalenessPolicy {
    window_days: i64,
}

impl StalenessPolicy {
    /// Create a policy with the given protection window in days.
    pub fn new(window_days: i64) -> Self {
        Self { window_days }
    }

    /// Assess a candidate against the verified entry's last verification time.
    ///
    /// `last_verified_at` is the ISO 8601 timestamp of the existing verified
    /// entry, or `None` when the field has never been verified. Timestamps
    /// that fail to parse count as stale.
    pub fn assess(&self, last_verified_at: Option<&str>, now: DateTime<Utc>) -> StalenessDecision {
        let Some(verified_at) = last_verified_at else {
            return StalenessDecision::Accept;
        };

        match DateTime::parse_from_rfc3339(verified_at) {
            Ok(ts) => {
                let age = now.signed_duration_since(ts.with_timezone(&Utc));
                if age.num_days() < self.window_days {
                    StalenessDecision::Skip
                } else {
                    StalenessDecision::Accept
                }
            }
            Err(e) => {
                warn!(verified_at, error = %e, "unparseable verification timestamp, treating as stale");
                StalenessDecision::Accept
            }
        }
    }
}

impl Default for StalenessPolicy {
    fn default() -> Self {
        Self::new(30)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn iso(ts: DateTime<Utc>) -> String {
        ts.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
    }

    #[test]
    fn fresh_verification_suppresses_candidate() {
        let policy = StalenessPolicy::default();
        let now = Utc::now();
        let ten_days_ago = iso(now - Duration::days(10));
        assert_eq!(
            policy.assess(Some(&ten_days_ago), now),
            StalenessDecision::Skip
        );
    }

    #[test]
    fn stale_verification_accepts_candidate() {
        let policy = StalenessPolicy::default();
        let now = Utc::now();
        let old = iso(now - Duration::days(31));
        assert_eq!(policy.assess(Some(&old), now), StalenessDecision::Accept);
    }

    #[test]
    fn boundary_is_exclusive_of_window() {
        let policy = StalenessPolicy::new(30);
        let now = Utc::now();
        // Exactly 30 days old: no longer inside the window.
        let exactly = iso(now - Duration::days(30));
        assert_eq!(policy.assess(Some(&exactly), now), StalenessDecision::Accept);
        // 29 days old: still protected.
        let inside = iso(now - Duration::days(29));
        assert_eq!(policy.assess(Some(&inside), now), StalenessDecision::Skip);
    }

    #[test]
    fn absent_verification_accepts() {
        let policy = StalenessPolicy::default();
        assert_eq!(policy.assess(None, Utc::now()), StalenessDecision::Accept);
    }

    #[test]
    fn unparseable_timestamp_counts_as_stale() {
        let policy = StalenessPolicy::default();
        assert_eq!(
            policy.assess(Some("not-a-timestamp"), Utc::now()),
            StalenessDecision::Accept
        );
    }

    #[test]
    fn zero_window_always_accepts() {
        let policy = StalenessPolicy::new(0);
        let now = Utc::now();
        let just_now = iso(now - Duration::seconds(5));
        assert_eq!(policy.assess(Some(&just_now), now), StalenessDecision::Accept);
    }
}
