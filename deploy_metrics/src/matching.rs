//! First-ride matching.
//!
//! Joins deployments to rides on the shared vehicle identity (a hash join;
//! the relation is many-to-many across time), keeps only rides starting at
//! or after the deployment, and picks the earliest such ride per deployment.
//! A ride that predates the deployment cannot have been caused by it.
//!
//! Deployments without a qualifying ride land in the no-ride partition;
//! matched and no-ride sets always partition the input exactly.

use chrono::{DateTime, TimeDelta, Utc};
use ride_events::models::{DeploymentEvent, RideEvent};
use std::collections::HashMap;
use uuid::Uuid;

/// One deployment paired with its earliest qualifying ride.
#[derive(Debug, Clone, PartialEq)]
pub struct FirstRide {
    /// Index of the deployment in the input slice.
    pub deployment_idx: usize,
    /// Start time of the matched ride.
    pub ride_time: DateTime<Utc>,
    /// Vehicle model tag carried by the matched ride, if any.
    pub ride_model: Option<String>,
    /// Elapsed time between deployment and first ride. Never negative.
    pub elapsed: TimeDelta,
    /// Elapsed time in hours (seconds / 3600).
    pub hours: f64,
}

/// Partition of deployments into matched and no-ride sets.
#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    /// Deployments with a first ride, in input order.
    pub matched: Vec<FirstRide>,
    /// Indices of deployments with no qualifying ride, in input order.
    pub no_ride: Vec<usize>,
}

/// Match each deployment to its earliest ride at or after the deployment
/// time. Ride lists keep input order, so equal timestamps break toward the
/// earlier row.
pub fn match_first_rides(deployments: &[DeploymentEvent], rides: &[RideEvent]) -> MatchOutcome {
    let mut by_vehicle: HashMap<Uuid, Vec<&RideEvent>> = HashMap::new();
    for ride in rides {
        by_vehicle.entry(ride.uuid).or_default().push(ride);
    }

    let mut outcome = MatchOutcome::default();
    for (idx, dep) in deployments.iter().enumerate() {
        let first = by_vehicle.get(&dep.uuid).and_then(|candidates| {
            candidates
                .iter()
                .filter(|ride| ride.started_at >= dep.deployed_at)
                .min_by_key(|ride| ride.started_at)
        });
        match first {
            Some(ride) => {
                let elapsed = ride.started_at - dep.deployed_at;
                outcome.matched.push(FirstRide {
                    deployment_idx: idx,
                    ride_time: ride.started_at,
                    ride_model: ride.vehicle_model.clone(),
                    elapsed,
                    hours: elapsed.num_seconds() as f64 / 3600.0,
                });
            }
            None => outcome.no_ride.push(idx),
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn dep(uuid: u128, ts: DateTime<Utc>) -> DeploymentEvent {
        DeploymentEvent {
            uuid: Uuid::from_u128(uuid),
            deployed_at: ts,
            deployed_on: ts.date_naive(),
            action_type: "deploy".into(),
            action_state: "completed".into(),
            lat: None,
            lng: None,
            vehicle_model: None,
        }
    }

    fn ride(uuid: u128, ts: DateTime<Utc>) -> RideEvent {
        RideEvent {
            uuid: Uuid::from_u128(uuid),
            started_at: ts,
            vehicle_model: None,
        }
    }

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, h, 0, 0).unwrap()
    }

    #[test]
    fn earlier_rides_are_excluded_and_first_later_ride_wins() {
        // Deployment at 10:00; rides at 09:00 (before) and 12:00 (after).
        let deployments = [dep(1, at(10))];
        let rides = [ride(1, at(9)), ride(1, at(12))];

        let outcome = match_first_rides(&deployments, &rides);
        assert_eq!(outcome.no_ride, Vec::<usize>::new());
        assert_eq!(outcome.matched.len(), 1);
        assert_eq!(outcome.matched[0].ride_time, at(12));
        assert_eq!(outcome.matched[0].hours, 2.0);
    }

    #[test]
    fn vehicle_without_rides_lands_in_no_ride() {
        let deployments = [dep(1, at(10)), dep(2, at(10))];
        let rides = [ride(1, at(11))];

        let outcome = match_first_rides(&deployments, &rides);
        assert_eq!(outcome.matched.len(), 1);
        assert_eq!(outcome.matched[0].deployment_idx, 0);
        assert_eq!(outcome.no_ride, vec![1]);
    }

    #[test]
    fn minimum_candidate_wins() {
        let deployments = [dep(1, at(8))];
        let rides = [ride(1, at(15)), ride(1, at(9)), ride(1, at(12))];

        let outcome = match_first_rides(&deployments, &rides);
        assert_eq!(outcome.matched[0].ride_time, at(9));
        assert_eq!(outcome.matched[0].hours, 1.0);
    }

    #[test]
    fn ride_at_deployment_instant_qualifies() {
        let deployments = [dep(1, at(10))];
        let rides = [ride(1, at(10))];

        let outcome = match_first_rides(&deployments, &rides);
        assert_eq!(outcome.matched[0].hours, 0.0);
    }

    #[test]
    fn one_vehicle_many_deployments() {
        // Two deployments of the same vehicle; the later one still matches
        // the earliest ride at or after it.
        let deployments = [dep(1, at(8)), dep(1, at(11))];
        let rides = [ride(1, at(9)), ride(1, at(13))];

        let outcome = match_first_rides(&deployments, &rides);
        assert_eq!(outcome.matched[0].ride_time, at(9));
        assert_eq!(outcome.matched[1].ride_time, at(13));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn causality_minimality_and_partition(
                deps in proptest::collection::vec((0u8..4, 0i64..200_000), 0..20),
                rides_in in proptest::collection::vec((0u8..4, 0i64..200_000), 0..40),
            ) {
                let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
                let deployments: Vec<_> = deps
                    .iter()
                    .map(|&(u, secs)| dep(u as u128 + 1, base + TimeDelta::seconds(secs)))
                    .collect();
                let rides: Vec<_> = rides_in
                    .iter()
                    .map(|&(u, secs)| ride(u as u128 + 1, base + TimeDelta::seconds(secs)))
                    .collect();

                let outcome = match_first_rides(&deployments, &rides);

                // Partition: every deployment is matched or no-ride, exactly once.
                prop_assert_eq!(outcome.matched.len() + outcome.no_ride.len(), deployments.len());

                for m in &outcome.matched {
                    let dep = &deployments[m.deployment_idx];
                    // Causality: never a negative elapsed duration.
                    prop_assert!(m.ride_time >= dep.deployed_at);
                    prop_assert!(m.hours >= 0.0);
                    // Minimality: no qualifying candidate is earlier.
                    let earliest = rides
                        .iter()
                        .filter(|r| r.uuid == dep.uuid && r.started_at >= dep.deployed_at)
                        .map(|r| r.started_at)
                        .min();
                    prop_assert_eq!(Some(m.ride_time), earliest);
                }
                for &idx in &outcome.no_ride {
                    let dep = &deployments[idx];
                    prop_assert!(
                        !rides.iter().any(|r| r.uuid == dep.uuid && r.started_at >= dep.deployed_at)
                    );
                }
            }
        }
    }
}
