//! Domain layer: records, codes, outcomes and time.

pub mod clock;
pub mod otp_code;
pub mod otp_record;
pub mod outcome;

pub use clock::{Clock, ManualClock, SystemClock};
pub use otp_code::OtpGenerator;
pub use otp_record::{ExpiryPolicy, OtpRecord};
pub use outcome::{StorageBackend, VerificationOutcome};
