use crate::*;
use chrono::NaiveDate;
use serde_json::json;
use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[test]
fn calendar_date_construction() {
    let from_ymd = CalendarDate::ymd(2020, 1, 15).unwrap();
    assert_eq!(date(2020, 1, 15), from_ymd.as_date());

    let from_digits = CalendarDate::from_yyyymmdd("20200115").unwrap();
    assert_eq!(from_ymd, from_digits);
}

#[test]
fn calendar_date_invalid_inputs() {
    assert!(CalendarDate::ymd(2020, 13, 1).is_err());
    assert!(CalendarDate::ymd(2019, 2, 29).is_err());
    assert!(CalendarDate::from_yyyymmdd("2020011").is_err());
    assert!(CalendarDate::from_yyyymmdd("202001155").is_err());
    assert!(CalendarDate::from_yyyymmdd("2020O115").is_err());
    assert!(CalendarDate::from_yyyymmdd("20200231").is_err());
}

#[test]
fn date_range() {
    let start = CalendarDate::ymd(2020, 2, 28).unwrap();
    let end = CalendarDate::ymd(2020, 3, 2).unwrap();

    let days: Vec<CalendarDate> = CalendarDate::range(&start, &end).collect();
    assert_eq!(3, days.len());
    assert_eq!(date(2020, 2, 28), days[0].as_date());
    assert_eq!(date(2020, 2, 29), days[1].as_date());
    assert_eq!(date(2020, 3, 1), days[2].as_date());

    // a consumed range can be re-derived
    assert_eq!(3, CalendarDate::range(&start, &end).count());

    let long: Vec<CalendarDate> = CalendarDate::range(
        &CalendarDate::ymd(2019, 12, 30).unwrap(),
        &CalendarDate::ymd(2020, 1, 4).unwrap(),
    )
    .collect();
    assert_eq!(5, long.len());
    for pair in long.windows(2) {
        assert_eq!(pair[0].next_day(), pair[1]);
    }
}

#[test]
fn date_range_empty() {
    let d1 = CalendarDate::ymd(2020, 1, 15).unwrap();
    let d2 = CalendarDate::ymd(2020, 1, 20).unwrap();
    assert_eq!(0, CalendarDate::range(&d1, &d1).count());
    assert_eq!(0, CalendarDate::range(&d2, &d1).count());
}

#[test]
fn calendar_date_comparisons() {
    let day = CalendarDate::ymd(2020, 1, 15).unwrap();

    assert!(day.equals("2020-01-15").unwrap());
    assert!(day.equals(date(2020, 1, 15)).unwrap());
    assert!(day.equals(&CalendarDate::ymd(2020, 1, 15).unwrap()).unwrap());

    assert_eq!(Ordering::Less, day.compare("2020-01-16").unwrap());
    assert_eq!(Ordering::Greater, day.compare(date(2019, 12, 31)).unwrap());

    let err = day.compare("not a date").unwrap_err();
    assert!(err.to_string().contains("not a date"));

    // infallible comparisons against plain dates
    assert_eq!(day, date(2020, 1, 15));
    assert!(day < date(2020, 1, 16));
}

#[test]
fn calendar_date_identity_ignores_association() {
    let mut plain = CalendarDate::ymd(2020, 1, 15).unwrap();
    let mut assigned = CalendarDate::ymd(2020, 1, 15).unwrap();
    assigned.feed_id = Some("F1".to_owned());
    assigned.service_id = Some("S1".to_owned());
    plain.feed_id = Some("F2".to_owned());

    assert_eq!(plain, assigned);
    assert_eq!(hash_of(&plain), hash_of(&assigned));

    let other_day = CalendarDate::ymd(2020, 1, 16).unwrap();
    assert_ne!(plain, other_day);
    assert_ne!(hash_of(&plain), hash_of(&other_day));

    let mut days = HashSet::new();
    days.insert(plain);
    assert!(!days.insert(assigned));
}

#[test]
fn calendar_date_arithmetic() {
    let day = CalendarDate::ymd(2020, 1, 15).unwrap();
    assert_eq!(date(2020, 1, 16), day.next_day().as_date());
    assert_eq!(date(2020, 2, 14), day.plus_days(30).as_date());
    assert_eq!(date(2020, 1, 5), day.plus_days(-10).as_date());
    // the receiver is untouched
    assert_eq!(date(2020, 1, 15), day.as_date());

    // 2020-01-15 was a Wednesday
    assert_eq!(2, day.dow());
    assert_eq!(0, day.plus_days(5).dow());
    assert_eq!(6, day.plus_days(4).dow());
}

#[test]
fn calendar_date_display() {
    let mut day = CalendarDate::ymd(2020, 1, 15).unwrap();
    assert_eq!("2020-01-15", format!("{}", day));

    day.feed_id = Some("F1".to_owned());
    // only one of the two ids assigned: still the date alone
    assert_eq!("2020-01-15", format!("{}", day));

    day.service_id = Some("S1".to_owned());
    assert_eq!("F1/S1 2020-01-15", format!("{}", day));
}

#[test]
fn trip_hops() {
    let mut trip = Trip::new(
        "F1".to_owned(),
        "T1".to_owned(),
        "R1".to_owned(),
        "S1".to_owned(),
    );
    for (sequence, stop_id) in [(1, "SA"), (2, "SB"), (3, "SC")] {
        trip.stop_times.push(StopTime::new(
            "F1".to_owned(),
            "T1".to_owned(),
            stop_id.to_owned(),
            sequence,
        ));
    }

    let hops: Vec<(&StopTime, &StopTime)> = trip.hops().collect();
    assert_eq!(2, hops.len());
    assert_eq!(("SA", "SB"), (hops[0].0.stop_id.as_str(), hops[0].1.stop_id.as_str()));
    assert_eq!(("SB", "SC"), (hops[1].0.stop_id.as_str(), hops[1].1.stop_id.as_str()));
}

#[test]
fn trip_hops_degenerate() {
    let mut trip = Trip::new(
        "F1".to_owned(),
        "T1".to_owned(),
        "R1".to_owned(),
        "S1".to_owned(),
    );
    assert_eq!(0, trip.hops().count());

    trip.stop_times.push(StopTime::new(
        "F1".to_owned(),
        "T1".to_owned(),
        "SA".to_owned(),
        1,
    ));
    assert_eq!(0, trip.hops().count());
}

#[test]
fn stop_time_identity() {
    let mut a = StopTime::new("F1".to_owned(), "T1".to_owned(), "SA".to_owned(), 1);
    let mut b = a.clone();
    a.arrival_time = Some(28800);
    b.arrival_time = Some(30600);

    // payload fields do not take part in identity
    assert_eq!(a, b);
    assert_eq!(hash_of(&a), hash_of(&b));

    let mut dedup = HashSet::new();
    dedup.insert(a.clone());
    assert!(!dedup.insert(b.clone()));

    // changing any one of the four key fields breaks identity
    let mutations: [fn(&mut StopTime); 4] = [
        |st| st.feed_id = "F2".to_owned(),
        |st| st.trip_id = "T2".to_owned(),
        |st| st.stop_id = "SB".to_owned(),
        |st| st.stop_sequence = 2,
    ];
    for mutate in mutations {
        let mut changed = a.clone();
        mutate(&mut changed);
        assert_ne!(a, changed);
    }
}

#[test]
fn stop_time_ordering() {
    let first = StopTime::new("F1".to_owned(), "T1".to_owned(), "SA".to_owned(), 1);
    let second = StopTime::new("F1".to_owned(), "T1".to_owned(), "SB".to_owned(), 2);

    // earlier in the trip and a distinct record, both at once
    assert_eq!(Ordering::Less, first.cmp_by_sequence(&second));
    assert_ne!(first, second);

    // same position, different stop: equal order, distinct identity
    let elsewhere = StopTime::new("F1".to_owned(), "T1".to_owned(), "SZ".to_owned(), 1);
    assert_eq!(Ordering::Equal, first.cmp_by_sequence(&elsewhere));
    assert_ne!(first, elsewhere);

    let mut unsorted = vec![second.clone(), first.clone()];
    unsorted.sort_by(|a, b| a.cmp_by_sequence(b));
    assert_eq!(vec![first, second], unsorted);
}

#[test]
fn extension_fields() {
    let mut stop = Stop::new(
        "F1".to_owned(),
        "S1".to_owned(),
        "Central".to_owned(),
        45.5,
        -73.5,
    );
    stop.extensions
        .insert("platform_code".to_owned(), json!("A"));
    stop.extensions.insert("level_index".to_owned(), json!(-2));
    stop.extensions
        .insert("zones".to_owned(), json!(["fare_a", "fare_b"]));

    assert_eq!(Some(&json!("A")), stop.extension("platform_code"));
    assert_eq!(Some(&json!(["fare_a", "fare_b"])), stop.extension("zones"));
    assert_eq!(None, stop.extension("nonexistent"));

    // only scalar extensions surface in the public representation
    let shown = format!("{}", stop);
    assert!(shown.contains("platform_code=\"A\""));
    assert!(shown.contains("level_index=-2"));
    assert!(!shown.contains("zones"));
}

#[test]
fn default_enum_values() {
    let stop = Stop::new(
        "F1".to_owned(),
        "S1".to_owned(),
        "Central".to_owned(),
        45.5,
        -73.5,
    );
    assert_eq!(LocationType::Stop, stop.location_type);
    assert_eq!(Availability::InformationNotAvailable, stop.wheelchair_boarding);
    assert_eq!(None, stop.parent_station);

    let trip = Trip::new(
        "F1".to_owned(),
        "T1".to_owned(),
        "R1".to_owned(),
        "S1".to_owned(),
    );
    assert_eq!(Availability::InformationNotAvailable, trip.wheelchair_accessible);
    assert_eq!(BikesAllowedType::NoBikeInfo, trip.bikes_allowed);
    assert_eq!(TimepointType::Exact, trip.exact_times);

    let stop_time = StopTime::new("F1".to_owned(), "T1".to_owned(), "S1".to_owned(), 1);
    assert_eq!(PickupDropOffType::Regular, stop_time.pickup_type);
    assert_eq!(PickupDropOffType::Regular, stop_time.drop_off_type);
    assert_eq!(TimepointType::Exact, stop_time.timepoint);
    assert!(!stop_time.interpolated);
}

#[test]
fn serialization_deserialization() {
    let agency: Agency = serde_json::from_str(
        r#"{"feed_id":"F1","agency_id":"A1","agency_name":"BIBUS","agency_url":"http://www.bibus.fr","agency_timezone":"Europe/Paris","agency_lang":"fr"}"#,
    )
    .unwrap();
    assert_eq!("BIBUS", agency.name);
    // unknown columns land in the extension map
    assert_eq!(Some(&json!("fr")), agency.extension("agency_lang"));

    let reparsed: Agency = serde_json::from_str(&serde_json::to_string(&agency).unwrap()).unwrap();
    assert_eq!(agency.id, reparsed.id);
    assert_eq!(agency.extensions, reparsed.extensions);

    let mut stop_time = StopTime::new("F1".to_owned(), "T1".to_owned(), "SA".to_owned(), 1);
    stop_time.arrival_time = Some(8 * 3600 + 1800);
    stop_time.departure_time = Some(8 * 3600 + 1860);
    stop_time.shape_dist_traveled = Some(1250.5);

    let row = serde_json::to_value(&stop_time).unwrap();
    // times travel in their feed form
    assert_eq!(Some(&json!("08:30:00")), row.get("arrival_time"));
    assert_eq!(Some(&json!("08:31:00")), row.get("departure_time"));

    let reparsed: StopTime = serde_json::from_value(row).unwrap();
    assert_eq!(Some(8 * 3600 + 1800), reparsed.arrival_time);
    assert_eq!(Some(1250.5), reparsed.shape_dist_traveled);
    assert_eq!(stop_time, reparsed);

    let day = CalendarDate::ymd(2020, 1, 15).unwrap();
    let value = serde_json::to_value(&day).unwrap();
    assert_eq!(Some(&json!("20200115")), value.get("date"));
    let reparsed: CalendarDate = serde_json::from_value(value).unwrap();
    assert_eq!(day, reparsed);
}

#[test]
fn unknown_enum_codes_are_kept() {
    let stop: Stop = serde_json::from_str(
        r#"{"feed_id":"F1","stop_id":"S1","stop_name":"Central","stop_lat":45.5,"stop_lon":-73.5,"location_type":"7","wheelchair_boarding":"9"}"#,
    )
    .unwrap();
    assert_eq!(LocationType::Unknown(7), stop.location_type);
    assert_eq!(Availability::Unknown(9), stop.wheelchair_boarding);

    // the undocumented code survives a round trip untouched
    let reparsed: Stop = serde_json::from_str(&serde_json::to_string(&stop).unwrap()).unwrap();
    assert_eq!(LocationType::Unknown(7), reparsed.location_type);

    let trip: Trip = serde_json::from_str(
        r#"{"feed_id":"F1","trip_id":"T1","route_id":"R1","service_id":"S1","bikes_allowed":"4"}"#,
    )
    .unwrap();
    assert_eq!(BikesAllowedType::Unknown(4), trip.bikes_allowed);

    let route: Route = serde_json::from_str(
        r#"{"feed_id":"F1","route_id":"R1","agency_id":"A1","route_type":42}"#,
    )
    .unwrap();
    assert_eq!(RouteType::Other(42), route.route_type);
}

#[test]
fn route_type_extended_codes() {
    for (code, expected) in [
        (3, RouteType::Bus),
        (715, RouteType::Bus),
        (200, RouteType::Coach),
        (1100, RouteType::Air),
        (900, RouteType::Tramway),
        (42, RouteType::Other(42)),
    ] {
        let route: Route = serde_json::from_value(json!({
            "feed_id": "F1",
            "route_id": "R1",
            "route_type": code,
        }))
        .unwrap();
        assert_eq!(expected, route.route_type, "code {}", code);
    }
}

#[test]
fn display() {
    let stop = Stop::new(
        "F1".to_owned(),
        "S1".to_owned(),
        "Central".to_owned(),
        45.5,
        -73.5,
    );
    assert_eq!(
        "Stop(id=F1/S1, stop_name=\"Central\", stop_lat=45.5, stop_lon=-73.5, \
         location_type=0, wheelchair_boarding=0)",
        format!("{}", stop)
    );

    let calendar = Calendar::new("F1".to_owned(), "WEEKDAYS".to_owned());
    assert_eq!("Calendar(id=F1/WEEKDAYS)", format!("{}", calendar));

    let stop_time = StopTime::new("F1".to_owned(), "T1".to_owned(), "SA".to_owned(), 3);
    assert_eq!(
        "StopTime(id=F1/T1/3, stop_id=\"SA\", interpolated=false, timepoint=1, \
         pickup_type=0, drop_off_type=0)",
        format!("{}", stop_time)
    );

    // attached stop times stay out of the trip representation
    let mut trip = Trip::new(
        "F1".to_owned(),
        "T1".to_owned(),
        "R1".to_owned(),
        "S1".to_owned(),
    );
    trip.stop_times.push(stop_time);
    assert!(!format!("{}", trip).contains("stop_id"));
}

#[test]
fn feed_scoping() {
    let agency = Agency::new(
        "F1".to_owned(),
        "A1".to_owned(),
        "BIBUS".to_owned(),
        "http://www.bibus.fr".to_owned(),
        "Europe/Paris".to_owned(),
    );
    assert_eq!("F1", FeedScoped::feed_id(&agency));

    let unassigned = CalendarDate::ymd(2020, 1, 15).unwrap();
    assert_eq!("", FeedScoped::feed_id(&unassigned));

    let info = FeedInfo::new("F1".to_owned());
    assert_eq!("F1", FeedScoped::feed_id(&info));
    assert_eq!("FeedInfo(id=F1)", format!("{}", info));
}
