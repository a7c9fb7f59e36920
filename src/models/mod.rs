pub mod observation;
pub mod raw;
pub mod schema;
pub mod station;

pub use observation::{CanonicalRecord, CanonicalRecordBuilder};
pub use raw::{Measurement, ObservationCollection, RawObservation, RawProperties};
pub use schema::Schema;
pub use station::{StationInfo, StationProperties};
