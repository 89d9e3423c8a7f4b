pub use crate::enums::*;
use crate::serde_helpers::*;
use serde_json::Value;

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Extra columns carried by a record beyond its standard schema
///
/// Feeds in the wild define extension columns freely; the loader stores them
/// here verbatim, keyed by column name. A `BTreeMap` keeps display output
/// stable.
pub type ExtraFields = BTreeMap<String, Value>;

/// Objects scoped to a source feed implement this trait
///
/// The feed identifier permits several datasets to coexist without identifier
/// collisions.
pub trait FeedScoped {
    /// Identifier of the feed this object belongs to
    fn feed_id(&self) -> &str;
}

/// Objects carrying open-ended extension columns implement this trait
pub trait Extensible {
    /// The extension columns attached to this object
    fn extensions(&self) -> &ExtraFields;

    /// Looks up one extension column by name
    fn extension(&self, name: &str) -> Option<&Value> {
        self.extensions().get(name)
    }
}

/// Introspection of the primitive-valued fields of an object
///
/// Used by the [fmt::Display] implementations: only scalar values (text,
/// numbers, booleans) are listed, identifier fields are left to the composite
/// id and collections such as [Trip::stop_times] are excluded so an attached
/// sequence can never blow up the output.
pub trait ScalarFields {
    /// Field names and values, standard columns first, then scalar extensions
    fn scalar_fields(&self) -> Vec<(String, Value)>;
}

fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}

fn scalar_extensions(extensions: &ExtraFields) -> impl Iterator<Item = (String, Value)> + '_ {
    extensions
        .iter()
        .filter(|(_, value)| is_scalar(value))
        .map(|(name, value)| (name.clone(), value.clone()))
}

fn fmt_record(
    f: &mut fmt::Formatter,
    name: &str,
    id: fmt::Arguments,
    fields: &[(String, Value)],
) -> fmt::Result {
    write!(f, "{}(id={}", name, id)?;
    for (field, value) in fields {
        write!(f, ", {}={}", field, value)?;
    }
    write!(f, ")")
}

/// Identifies one source dataset. See <https://gtfs.org/reference/static/#feed_infotxt>
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct FeedInfo {
    /// Identifier of the feed
    pub feed_id: String,
    /// Feed-specific extension columns
    #[serde(flatten)]
    pub extensions: ExtraFields,
}

impl FeedInfo {
    /// Creates the record identifying feed `feed_id`
    pub fn new(feed_id: String) -> FeedInfo {
        FeedInfo {
            feed_id,
            extensions: ExtraFields::new(),
        }
    }
}

impl FeedScoped for FeedInfo {
    fn feed_id(&self) -> &str {
        &self.feed_id
    }
}

impl Extensible for FeedInfo {
    fn extensions(&self) -> &ExtraFields {
        &self.extensions
    }
}

impl ScalarFields for FeedInfo {
    fn scalar_fields(&self) -> Vec<(String, Value)> {
        scalar_extensions(&self.extensions).collect()
    }
}

impl fmt::Display for FeedInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt_record(
            f,
            "FeedInfo",
            format_args!("{}", self.feed_id),
            &self.scalar_fields(),
        )
    }
}

/// A transit operator within a feed. See <https://gtfs.org/reference/static/#agencytxt>
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Agency {
    /// Feed this agency belongs to
    pub feed_id: String,
    /// Unique technical identifier (not for the traveller) of the agency
    #[serde(rename = "agency_id")]
    pub id: String,
    /// Full name of the transit agency
    #[serde(rename = "agency_name")]
    pub name: String,
    /// URL of a web page about the transit agency
    #[serde(rename = "agency_url")]
    pub url: String,
    /// Timezone where the transit agency is located
    #[serde(rename = "agency_timezone")]
    pub timezone: String,
    /// Feed-specific extension columns
    #[serde(flatten)]
    pub extensions: ExtraFields,
}

impl Agency {
    /// Creates an agency from its required columns
    pub fn new(feed_id: String, id: String, name: String, url: String, timezone: String) -> Agency {
        Agency {
            feed_id,
            id,
            name,
            url,
            timezone,
            extensions: ExtraFields::new(),
        }
    }
}

impl FeedScoped for Agency {
    fn feed_id(&self) -> &str {
        &self.feed_id
    }
}

impl Extensible for Agency {
    fn extensions(&self) -> &ExtraFields {
        &self.extensions
    }
}

impl ScalarFields for Agency {
    fn scalar_fields(&self) -> Vec<(String, Value)> {
        let mut fields = vec![
            ("agency_name".to_owned(), Value::from(self.name.as_str())),
            ("agency_url".to_owned(), Value::from(self.url.as_str())),
            (
                "agency_timezone".to_owned(),
                Value::from(self.timezone.as_str()),
            ),
        ];
        fields.extend(scalar_extensions(&self.extensions));
        fields
    }
}

impl fmt::Display for Agency {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt_record(
            f,
            "Agency",
            format_args!("{}/{}", self.feed_id, self.id),
            &self.scalar_fields(),
        )
    }
}

/// A physical stop or station. See <https://gtfs.org/reference/static/#stopstxt>
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Stop {
    /// Feed this stop belongs to
    pub feed_id: String,
    /// Unique technical identifier (not for the traveller) of the stop
    #[serde(rename = "stop_id")]
    pub id: String,
    /// Name of the location, in the local and tourist vernacular
    #[serde(rename = "stop_name")]
    pub name: String,
    /// Latitude of the stop
    #[serde(rename = "stop_lat")]
    pub latitude: f64,
    /// Longitude of the stop
    #[serde(rename = "stop_lon")]
    pub longitude: f64,
    /// Type of the location
    #[serde(default)]
    pub location_type: LocationType,
    /// Defines hierarchy between locations: if set, should reference a stop
    /// with [LocationType::Station]. Not enforced here, resolution is the
    /// store's job.
    pub parent_station: Option<String>,
    /// Indicates whether wheelchair boardings are possible from the location
    #[serde(deserialize_with = "de_with_empty_default", default)]
    pub wheelchair_boarding: Availability,
    /// Feed-specific extension columns
    #[serde(flatten)]
    pub extensions: ExtraFields,
}

impl Stop {
    /// Creates a stop from its required columns
    pub fn new(feed_id: String, id: String, name: String, latitude: f64, longitude: f64) -> Stop {
        Stop {
            feed_id,
            id,
            name,
            latitude,
            longitude,
            ..Stop::default()
        }
    }
}

impl FeedScoped for Stop {
    fn feed_id(&self) -> &str {
        &self.feed_id
    }
}

impl Extensible for Stop {
    fn extensions(&self) -> &ExtraFields {
        &self.extensions
    }
}

impl ScalarFields for Stop {
    fn scalar_fields(&self) -> Vec<(String, Value)> {
        let mut fields = vec![
            ("stop_name".to_owned(), Value::from(self.name.as_str())),
            ("stop_lat".to_owned(), Value::from(self.latitude)),
            ("stop_lon".to_owned(), Value::from(self.longitude)),
            (
                "location_type".to_owned(),
                Value::from(self.location_type.code()),
            ),
            (
                "wheelchair_boarding".to_owned(),
                Value::from(self.wheelchair_boarding.code()),
            ),
        ];
        if let Some(parent) = &self.parent_station {
            fields.push(("parent_station".to_owned(), Value::from(parent.as_str())));
        }
        fields.extend(scalar_extensions(&self.extensions));
        fields
    }
}

impl fmt::Display for Stop {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt_record(
            f,
            "Stop",
            format_args!("{}/{}", self.feed_id, self.id),
            &self.scalar_fields(),
        )
    }
}

/// A transit line. See <https://gtfs.org/reference/static/#routestxt>
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Route {
    /// Feed this route belongs to
    pub feed_id: String,
    /// Unique technical identifier (not for the traveller) of the route
    #[serde(rename = "route_id")]
    pub id: String,
    /// Agency operating the route
    pub agency_id: Option<String>,
    /// Indicates the type of transportation used on the route
    #[serde(default)]
    pub route_type: RouteType,
    /// Feed-specific extension columns
    #[serde(flatten)]
    pub extensions: ExtraFields,
}

impl Route {
    /// Creates a route from its required columns
    pub fn new(
        feed_id: String,
        id: String,
        agency_id: Option<String>,
        route_type: RouteType,
    ) -> Route {
        Route {
            feed_id,
            id,
            agency_id,
            route_type,
            extensions: ExtraFields::new(),
        }
    }
}

impl FeedScoped for Route {
    fn feed_id(&self) -> &str {
        &self.feed_id
    }
}

impl Extensible for Route {
    fn extensions(&self) -> &ExtraFields {
        &self.extensions
    }
}

impl ScalarFields for Route {
    fn scalar_fields(&self) -> Vec<(String, Value)> {
        let mut fields = Vec::new();
        if let Some(agency_id) = &self.agency_id {
            fields.push(("agency_id".to_owned(), Value::from(agency_id.as_str())));
        }
        fields.push(("route_type".to_owned(), Value::from(self.route_type.code())));
        fields.extend(scalar_extensions(&self.extensions));
        fields
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt_record(
            f,
            "Route",
            format_args!("{}/{}", self.feed_id, self.id),
            &self.scalar_fields(),
        )
    }
}

/// A named service-availability pattern, referenced by trips through
/// `service_id`. See <https://gtfs.org/reference/static/#calendartxt>
///
/// The days the pattern runs on are separate [CalendarDate](crate::CalendarDate)
/// values, associated by the loader.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Calendar {
    /// Feed this calendar belongs to
    pub feed_id: String,
    /// Unique technical identifier (not for the traveller) of this calendar
    #[serde(rename = "service_id")]
    pub id: String,
    /// Feed-specific extension columns
    #[serde(flatten)]
    pub extensions: ExtraFields,
}

impl Calendar {
    /// Creates the calendar identified by (`feed_id`, `id`)
    pub fn new(feed_id: String, id: String) -> Calendar {
        Calendar {
            feed_id,
            id,
            extensions: ExtraFields::new(),
        }
    }
}

impl FeedScoped for Calendar {
    fn feed_id(&self) -> &str {
        &self.feed_id
    }
}

impl Extensible for Calendar {
    fn extensions(&self) -> &ExtraFields {
        &self.extensions
    }
}

impl ScalarFields for Calendar {
    fn scalar_fields(&self) -> Vec<(String, Value)> {
        scalar_extensions(&self.extensions).collect()
    }
}

impl fmt::Display for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt_record(
            f,
            "Calendar",
            format_args!("{}/{}", self.feed_id, self.id),
            &self.scalar_fields(),
        )
    }
}

/// One scheduled vehicle run on a route. See <https://gtfs.org/reference/static/#tripstxt>
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Trip {
    /// Feed this trip belongs to
    pub feed_id: String,
    /// Unique technical identifier (not for the traveller) of the trip
    #[serde(rename = "trip_id")]
    pub id: String,
    /// References along which [Route] this trip runs
    pub route_id: String,
    /// References the [Calendar] on which this trip runs
    pub service_id: String,
    /// Indicates wheelchair accessibility
    #[serde(deserialize_with = "de_with_empty_default", default)]
    pub wheelchair_accessible: Availability,
    /// Indicates whether bikes are allowed. Available means "at least one"
    #[serde(deserialize_with = "de_with_empty_default", default)]
    pub bikes_allowed: BikesAllowedType,
    /// Whether the timetable of the whole trip is exact or approximate
    #[serde(deserialize_with = "de_with_empty_default", default)]
    pub exact_times: TimepointType,
    /// All the stop times of the trip, attached by the loader once every stop
    /// time row of the trip is known, sorted by stop sequence
    #[serde(skip)]
    pub stop_times: Vec<StopTime>,
    /// Feed-specific extension columns
    #[serde(flatten)]
    pub extensions: ExtraFields,
}

impl Trip {
    /// Creates a trip from its required columns
    pub fn new(feed_id: String, id: String, route_id: String, service_id: String) -> Trip {
        Trip {
            feed_id,
            id,
            route_id,
            service_id,
            ..Trip::default()
        }
    }

    /// Directed travel segments between consecutive stops of the trip
    ///
    /// Lazily yields the (from, to) stop time of every hop, assuming
    /// [Trip::stop_times] is already sorted by stop sequence. Trips with fewer
    /// than two stop times yield nothing.
    pub fn hops(&self) -> impl Iterator<Item = (&StopTime, &StopTime)> {
        self.stop_times.iter().zip(self.stop_times.iter().skip(1))
    }
}

impl FeedScoped for Trip {
    fn feed_id(&self) -> &str {
        &self.feed_id
    }
}

impl Extensible for Trip {
    fn extensions(&self) -> &ExtraFields {
        &self.extensions
    }
}

impl ScalarFields for Trip {
    fn scalar_fields(&self) -> Vec<(String, Value)> {
        let mut fields = vec![
            ("route_id".to_owned(), Value::from(self.route_id.as_str())),
            (
                "service_id".to_owned(),
                Value::from(self.service_id.as_str()),
            ),
            (
                "wheelchair_accessible".to_owned(),
                Value::from(self.wheelchair_accessible.code()),
            ),
            (
                "bikes_allowed".to_owned(),
                Value::from(self.bikes_allowed.code()),
            ),
            (
                "exact_times".to_owned(),
                Value::from(self.exact_times.code()),
            ),
        ];
        fields.extend(scalar_extensions(&self.extensions));
        fields
    }
}

impl fmt::Display for Trip {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt_record(
            f,
            "Trip",
            format_args!("{}/{}", self.feed_id, self.id),
            &self.scalar_fields(),
        )
    }
}

/// The moment where a vehicle running on a [Trip] serves a stop. See <https://gtfs.org/reference/static/#stop_timestxt>
///
/// Identity is the full (feed, trip, stop, sequence) key; chronological order
/// along the trip is by [StopTime::stop_sequence] alone, see
/// [StopTime::cmp_by_sequence].
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct StopTime {
    /// Feed this stop time belongs to
    pub feed_id: String,
    /// [Trip] this stop time belongs to
    pub trip_id: String,
    /// [Stop] where the vehicle stops
    pub stop_id: String,
    /// Order of this stop within the trip. Values increase along the trip but
    /// need not be consecutive
    pub stop_sequence: u32,
    /// Arrival time in seconds since midnight. None when the source row
    /// carried no time and it has not been interpolated yet
    #[serde(
        deserialize_with = "deserialize_optional_time",
        serialize_with = "serialize_optional_time",
        default
    )]
    pub arrival_time: Option<u32>,
    /// Departure time in seconds since midnight. None when the source row
    /// carried no time and it has not been interpolated yet
    #[serde(
        deserialize_with = "deserialize_optional_time",
        serialize_with = "serialize_optional_time",
        default
    )]
    pub departure_time: Option<u32>,
    /// Actual distance traveled along the trip shape from the first stop
    #[serde(
        deserialize_with = "de_with_optional_float",
        serialize_with = "serialize_float_as_str",
        default
    )]
    pub shape_dist_traveled: Option<f64>,
    /// True when the times were computed by interpolation rather than read
    /// from the source data
    #[serde(default)]
    pub interpolated: bool,
    /// Indicates if the times are strictly adhered to by the vehicle
    #[serde(default)]
    pub timepoint: TimepointType,
    /// Indicates pickup method
    #[serde(default)]
    pub pickup_type: PickupDropOffType,
    /// Indicates drop off method
    #[serde(default)]
    pub drop_off_type: PickupDropOffType,
    /// Feed-specific extension columns
    #[serde(flatten)]
    pub extensions: ExtraFields,
}

impl StopTime {
    /// Creates a stop time from its identity key, everything else defaulted
    pub fn new(feed_id: String, trip_id: String, stop_id: String, stop_sequence: u32) -> StopTime {
        StopTime {
            feed_id,
            trip_id,
            stop_id,
            stop_sequence,
            ..StopTime::default()
        }
    }

    fn primary_key(&self) -> (&str, &str, &str, u32) {
        (
            &self.feed_id,
            &self.trip_id,
            &self.stop_id,
            self.stop_sequence,
        )
    }

    /// Chronological order along the trip: by [StopTime::stop_sequence] alone
    ///
    /// Kept apart from [Eq], which uses the full identity key: two stop times
    /// at different stops can compare equal here while being distinct records.
    /// For sorting, `sort_by_key(|st| st.stop_sequence)` is equivalent.
    pub fn cmp_by_sequence(&self, other: &StopTime) -> Ordering {
        self.stop_sequence.cmp(&other.stop_sequence)
    }
}

impl PartialEq for StopTime {
    fn eq(&self, other: &StopTime) -> bool {
        self.primary_key() == other.primary_key()
    }
}

impl Eq for StopTime {}

impl Hash for StopTime {
    // Consistent with equality: the identity key only, never the payload
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.primary_key().hash(state);
    }
}

impl FeedScoped for StopTime {
    fn feed_id(&self) -> &str {
        &self.feed_id
    }
}

impl Extensible for StopTime {
    fn extensions(&self) -> &ExtraFields {
        &self.extensions
    }
}

impl ScalarFields for StopTime {
    fn scalar_fields(&self) -> Vec<(String, Value)> {
        let mut fields = vec![("stop_id".to_owned(), Value::from(self.stop_id.as_str()))];
        if let Some(arrival) = self.arrival_time {
            fields.push(("arrival_time".to_owned(), Value::from(arrival)));
        }
        if let Some(departure) = self.departure_time {
            fields.push(("departure_time".to_owned(), Value::from(departure)));
        }
        if let Some(distance) = self.shape_dist_traveled {
            fields.push(("shape_dist_traveled".to_owned(), Value::from(distance)));
        }
        fields.push(("interpolated".to_owned(), Value::from(self.interpolated)));
        fields.push(("timepoint".to_owned(), Value::from(self.timepoint.code())));
        fields.push((
            "pickup_type".to_owned(),
            Value::from(self.pickup_type.code()),
        ));
        fields.push((
            "drop_off_type".to_owned(),
            Value::from(self.drop_off_type.code()),
        ));
        fields.extend(scalar_extensions(&self.extensions));
        fields
    }
}

impl fmt::Display for StopTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt_record(
            f,
            "StopTime",
            format_args!("{}/{}/{}", self.feed_id, self.trip_id, self.stop_sequence),
            &self.scalar_fields(),
        )
    }
}

impl FeedScoped for crate::CalendarDate {
    // Empty until the loader assigns the date to a feed
    fn feed_id(&self) -> &str {
        self.feed_id.as_deref().unwrap_or("")
    }
}
