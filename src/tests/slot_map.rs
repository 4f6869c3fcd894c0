use crate::{
    Error,
    cluster::{Endpoint, SlotMap, SlotRange},
    tests::{endpoint, test_slot_map},
};

#[test]
fn endpoint_uri_form() {
    let endpoint = Endpoint::from_host_port("10.0.0.2", 6380);
    assert_eq!("redis://10.0.0.2:6380", endpoint.as_str());
    assert_eq!("redis://10.0.0.2:6380", endpoint.to_string());
    assert_eq!(Endpoint::from("redis://10.0.0.2:6380"), endpoint);
}

#[test]
fn lookup_at_range_boundaries() {
    let slot_map = test_slot_map();

    assert_eq!(
        Some(endpoint(7000)),
        slot_map.endpoints_for_slot(0).map(|e| e[0].clone())
    );
    assert_eq!(
        Some(endpoint(7000)),
        slot_map.endpoints_for_slot(5460).map(|e| e[0].clone())
    );
    assert_eq!(
        Some(endpoint(7001)),
        slot_map.endpoints_for_slot(5461).map(|e| e[0].clone())
    );
    assert_eq!(
        Some(endpoint(7002)),
        slot_map.endpoints_for_slot(16383).map(|e| e[0].clone())
    );
}

#[test]
fn unassigned_slot_has_no_endpoints() {
    let slot_map = SlotMap::new(vec![
        SlotRange::new(0, 100, [endpoint(7000)]),
        SlotRange::new(200, 300, [endpoint(7001)]),
    ])
    .unwrap();

    assert!(slot_map.endpoints_for_slot(150).is_none());
    assert!(slot_map.endpoints_for_key(150).is_none());
    assert!(slot_map.endpoints_for_slot(301).is_none());
}

#[test]
fn endpoints_is_the_set_union() {
    let slot_map = test_slot_map();
    let endpoints = slot_map.endpoints();

    assert_eq!(4, endpoints.len());
    for port in [7000, 7001, 7002, 7003] {
        assert!(endpoints.contains(&endpoint(port)));
    }
}

#[test]
fn size_counts_slot_groupings() {
    let slot_map = test_slot_map();
    assert_eq!(3, slot_map.size());

    for index in 0..slot_map.size() {
        let endpoints = slot_map.endpoints_for_group(index).unwrap();
        assert!(!endpoints.is_empty());
    }
    assert!(slot_map.endpoints_for_group(3).is_none());
}

#[test]
fn groups_are_ordered_by_slot_and_master_first() {
    let slot_map = test_slot_map();

    assert_eq!(
        Some(endpoint(7000)),
        slot_map.endpoints_for_group(0).map(|e| e[0].clone())
    );
    assert_eq!(
        Some(endpoint(7003)),
        slot_map.endpoints_for_group(0).map(|e| e[1].clone())
    );
    assert_eq!(
        Some(endpoint(7002)),
        slot_map.endpoints_for_group(2).map(|e| e[0].clone())
    );
}

#[test]
fn random_endpoint_belongs_to_the_map() {
    let slot_map = test_slot_map();
    let endpoints = slot_map.endpoints();

    for _ in 0..20 {
        assert!(endpoints.contains(slot_map.random_endpoint().unwrap()));
    }
}

#[test]
fn random_endpoint_of_an_empty_map_is_none() {
    let slot_map = SlotMap::new(Vec::new()).unwrap();
    assert!(slot_map.random_endpoint().is_none());
    assert_eq!(0, slot_map.size());
}

#[test]
fn overlapping_ranges_are_rejected() {
    let result = SlotMap::new(vec![
        SlotRange::new(0, 100, [endpoint(7000)]),
        SlotRange::new(100, 200, [endpoint(7001)]),
    ]);

    assert!(matches!(result, Err(Error::Config(reason)) if reason.contains("Overlapping")));
}

#[test]
fn out_of_bounds_range_is_rejected() {
    let result = SlotMap::new(vec![SlotRange::new(0, 16384, [endpoint(7000)])]);
    assert!(matches!(result, Err(Error::Config(_))));

    let result = SlotMap::new(vec![SlotRange::new(10, 5, [endpoint(7000)])]);
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn empty_endpoint_list_is_rejected() {
    let result = SlotMap::new(vec![SlotRange::new(0, 100, Vec::new())]);
    assert!(matches!(result, Err(Error::Config(reason)) if reason.contains("No endpoints")));
}
