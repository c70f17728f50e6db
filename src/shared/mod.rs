pub mod clock;
pub mod errors;
pub mod shutdown;

pub use clock::{Clock, ManualClock, SystemClock};
pub use errors::{DomainError, FieldErrors, FieldErrorsBuilder};
pub use shutdown::{ShutdownCoordinator, ShutdownSignal};
