/*! In-memory entity model for [General Transit Feed Specification](https://gtfs.org/) (GTFS) schedule datasets.

This crate brings plain record types for the objects of a transit schedule feed
(agencies, stops, routes, calendars, trips, stop times) together with the small
amount of domain logic they carry: calendar date arithmetic, ordering of stop
times within a trip, and identity semantics for deduplication.

## Design decisions

### Feed scoping

Every record carries a `feed_id` tying it to one source dataset, so several
feeds can coexist in the same process (or the same map) without identifier
collisions. See [FeedScoped].

### Relations by identifier

Records reference each other by plain identifier fields (`Trip::route_id`,
`Stop::parent_station`, ...), never by owning pointers. Resolving those
references is the job of an external store; this crate neither resolves nor
validates them. The one exception to "records stand alone" is
[Trip::stop_times], a sequence the loader attaches once all stop time rows of
the trip are known.

### Extension columns

Feeds in the wild define columns beyond the standard schema. Every record
except [CalendarDate] stores such columns verbatim in an open map, see
[Extensible]. Only scalar values count as "public" for display purposes.

### No validation

This layer holds data, it does not validate it. Out-of-range enumeration codes
are kept as-is in a catch-all variant (feeds sometimes use undocumented codes),
and no cross-record integrity is checked.

### Reading and writing

There is no loader here. Records (de)serialize with [serde](https://serde.rs)
using the field codes and column names of the reference
<https://gtfs.org/reference/static>, so an external loader can feed rows
straight into them.

*/
#![warn(missing_docs)]

#[macro_use]
extern crate derivative;
#[macro_use]
extern crate serde_derive;

mod calendar_date;
mod enums;
pub mod error;
mod objects;
mod serde_helpers;

#[cfg(test)]
mod tests;

pub use calendar_date::{CalendarDate, DateOperand, DateRange};
pub use error::Error;
pub use objects::*;
