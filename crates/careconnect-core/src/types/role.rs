//! Account roles issued by the backend.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

/// Role claimed by a credential.
///
/// Labels match the backend's `userType` claim exactly (case-sensitive).
/// Choosing which dashboard to show for a role is left to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumIter, EnumString, IntoStaticStr)]
pub enum Role {
    /// Hospital administrator: verifies users, manages staff and doctors.
    Admin,
    /// Doctor: sees own appointments, uploads prescriptions.
    Doctor,
    /// Patient: books and cancels appointments.
    Patient,
    /// Front-desk staff: registers patients, accepts payments.
    Staff,
}

impl Role {
    /// Returns `true` if this role may book appointments.
    ///
    /// Staff book on behalf of walk-in patients.
    #[must_use]
    pub const fn can_book(self) -> bool {
        matches!(self, Self::Patient | Self::Staff)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_parse_backend_labels() {
        assert_eq!(Role::from_str("Admin").unwrap(), Role::Admin);
        assert_eq!(Role::from_str("Doctor").unwrap(), Role::Doctor);
        assert_eq!(Role::from_str("Patient").unwrap(), Role::Patient);
        assert_eq!(Role::from_str("Staff").unwrap(), Role::Staff);
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert!(Role::from_str("doctor").is_err());
        assert!(Role::from_str("").is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for role in Role::iter() {
            assert_eq!(Role::from_str(&role.to_string()).unwrap(), role);
        }
    }

    #[test]
    fn test_can_book() {
        assert!(Role::Patient.can_book());
        assert!(Role::Staff.can_book());
        assert!(!Role::Doctor.can_book());
        assert!(!Role::Admin.can_book());
    }
}
