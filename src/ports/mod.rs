//! Port value domains and the conversions allowed between them.

pub mod coerce;
pub mod value;

pub use coerce::{Compatibility, coerce, compatibility};
pub use value::{PortType, Value};
