mod common;
use common::{at, count, deployment, ride, setup_db};

use deploy_metrics::db;
use deploy_metrics::store::{
    load_deployments, load_rides, upsert_deployments, upsert_rides,
};

#[test]
fn upsert_is_idempotent_and_first_write_wins() {
    let (_db, mut conn) = setup_db();

    let first = vec![deployment(1, at(1, 10)), deployment(2, at(1, 11))];
    let report = upsert_deployments(&mut conn, &first).expect("upsert");
    assert_eq!(report.inserted, 2);
    assert_eq!(report.ignored, 0);

    // Same keys again, one row mutated: nothing changes.
    let mut again = first.clone();
    again[0].vehicle_model = Some("bike-x".into());
    let report = upsert_deployments(&mut conn, &again).expect("re-upsert");
    assert_eq!(report.inserted, 0);
    assert_eq!(report.ignored, 2);

    assert_eq!(count(&mut conn, "deployments"), 2);
    let loaded = load_deployments(&mut conn).expect("load");
    assert_eq!(loaded, first);
}

#[test]
fn same_vehicle_different_times_are_distinct_rows() {
    let (_db, mut conn) = setup_db();

    let events = vec![deployment(1, at(1, 10)), deployment(1, at(2, 10))];
    let report = upsert_deployments(&mut conn, &events).expect("upsert");
    assert_eq!(report.inserted, 2);
    assert_eq!(count(&mut conn, "deployments"), 2);
}

#[test]
fn loads_come_back_in_timestamp_order() {
    let (_db, mut conn) = setup_db();

    let events = vec![
        deployment(3, at(3, 9)),
        deployment(1, at(1, 9)),
        deployment(2, at(2, 9)),
    ];
    upsert_deployments(&mut conn, &events).expect("upsert");

    let loaded = load_deployments(&mut conn).expect("load");
    let order: Vec<_> = loaded.iter().map(|d| d.deployed_at).collect();
    assert_eq!(order, vec![at(1, 9), at(2, 9), at(3, 9)]);
}

#[test]
fn ride_upserts_accumulate_across_sessions() {
    let (db_handle, mut conn) = setup_db();

    let first = vec![ride(1, at(1, 12))];
    assert_eq!(upsert_rides(&mut conn, &first).unwrap().inserted, 1);
    drop(conn);

    // A later session re-uploads an overlapping export.
    let mut conn = db::open_store(&db_handle.path).expect("reopen");
    let second = vec![ride(1, at(1, 12)), ride(2, at(2, 12))];
    let report = upsert_rides(&mut conn, &second).unwrap();
    assert_eq!(report.inserted, 1);
    assert_eq!(report.ignored, 1);

    let loaded = load_rides(&mut conn).expect("load");
    assert_eq!(loaded.len(), 2);
    assert_eq!(count(&mut conn, "rides"), 2);
}

#[test]
fn empty_upsert_is_a_noop() {
    let (_db, mut conn) = setup_db();
    let report = upsert_deployments(&mut conn, &[]).expect("upsert");
    assert_eq!(report.inserted, 0);
    assert_eq!(report.ignored, 0);
    assert_eq!(count(&mut conn, "deployments"), 0);
}
