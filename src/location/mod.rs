//! # Location acquisition.
//!
//! - [`Location`] resolved coordinates
//! - [`LocationProvider`] single-shot async lookup trait ([`LocationRef`] = `Arc<dyn LocationProvider>`)
//! - [`LocationFn`] closure-backed provider; [`FixedLocation`] and [`NoLocation`] built-ins
//! - `LocationLookup` (crate-internal) runs one attempt as a task the controller can abandon

mod location_fn;
mod lookup;
mod point;
mod provider;

pub(crate) use lookup::LocationLookup;
pub use location_fn::LocationFn;
pub use point::Location;
pub use provider::{FixedLocation, LocationProvider, LocationRef, NoLocation};
