//! Pure attendance and payroll computations over already-fetched records.
//!
//! Nothing in here touches storage; the `service` layer loads the inputs and
//! writes the results.

pub mod allocation;
pub mod calendar;
pub mod lop;
pub mod normalizer;
pub mod summary;
