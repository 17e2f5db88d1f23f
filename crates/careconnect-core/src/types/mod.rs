//! Domain types shared by the session gate, the resolver and backends.

mod appointment;
mod booking;
mod outcome;
mod prescription;
mod profile;
mod provider;
mod role;
mod work_day;
pub(crate) mod wire;

pub use appointment::{Appointment, AppointmentStatus};
pub use booking::BookingRecord;
pub use outcome::ApiOutcome;
pub use prescription::Prescription;
pub use profile::UserProfile;
pub use provider::Provider;
pub use role::Role;
pub use work_day::WorkDay;

/// Platform fee applied when a provider has none configured.
pub const DEFAULT_CONSULTATION_FEE: u32 = 500;
