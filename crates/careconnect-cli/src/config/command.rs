//! Subcommands.

use careconnect_core::availability::TimeSlot;
use clap::Subcommand;
use jiff::civil::Date;

/// What the client should do.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Sign in and store the issued credential
    Login {
        #[arg(long, env = "CARECONNECT_EMAIL")]
        email: String,
        #[arg(long, env = "CARECONNECT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Clear the stored credential and profile
    Logout,
    /// Show the current session
    Status {
        /// Keep running and report session changes until Ctrl+C
        #[arg(long)]
        watch: bool,
    },
    /// List the bookable time slots
    Slots,
    /// List doctors working on a date (YYYY-MM-DD)
    Doctors {
        #[arg(long)]
        date: String,
    },
    /// Book an appointment with a doctor
    Book {
        /// Doctor identifier
        #[arg(long)]
        doctor: String,
        #[arg(long)]
        date: Date,
        /// Slot label, for example "9:30 AM"
        #[arg(long)]
        time: TimeSlot,
    },
    /// List your appointments
    Appointments {
        /// Only completed appointments, the ones open for feedback
        #[arg(long)]
        completed: bool,
    },
    /// Cancel an appointment
    Cancel {
        /// Appointment identifier
        #[arg(long)]
        id: String,
    },
    /// Review a completed appointment, or withdraw a review
    Feedback {
        /// Appointment identifier
        #[arg(long)]
        id: String,
        #[arg(long, required_unless_present = "withdraw")]
        review: Option<String>,
        /// Stars from 1 to 5
        #[arg(long, required_unless_present = "withdraw")]
        rating: Option<u8>,
        /// Remove the review left on this appointment
        #[arg(long, conflicts_with_all = ["review", "rating"])]
        withdraw: bool,
    },
    /// List your prescriptions
    Prescriptions,
    /// Change your password; signs you out on success
    Password {
        #[arg(long, env = "CARECONNECT_PASSWORD", hide_env_values = true)]
        current: String,
        #[arg(long = "new", env = "CARECONNECT_NEW_PASSWORD", hide_env_values = true)]
        new_password: String,
    },
}

impl Command {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Login { .. } => "login",
            Self::Logout => "logout",
            Self::Status { .. } => "status",
            Self::Slots => "slots",
            Self::Doctors { .. } => "doctors",
            Self::Book { .. } => "book",
            Self::Appointments { .. } => "appointments",
            Self::Cancel { .. } => "cancel",
            Self::Feedback { .. } => "feedback",
            Self::Prescriptions => "prescriptions",
            Self::Password { .. } => "password",
        }
    }
}
