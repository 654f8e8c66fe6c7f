//! Windowed computations over sensor timeseries.
//!
//! [`execute`] is the single entry point: it decodes each sensor's readings
//! ([`codec`]), runs the named computation ([`functions`]) and encodes the
//! results under the labels they came in with.

pub mod codec;
mod dispatch;
pub mod error;
pub mod functions;
pub mod value;

pub use {
    dispatch::execute,
    error::{ComputeError, Issue, Result},
    functions::{Computation, Func},
};
