// ops-status - operational mode toggles and business-hours check
// Exposes both function handlers for the invoker binary and for tests

pub mod clock;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod status;
pub mod store;
pub mod telemetry;

// Re-export key types for easy access
pub use clock::{handle_clock_invocation, BusinessHours, Clock, ClockResponse, FixedClock, SystemClock};
pub use config::{AppConfig, AuthPolicy, StoreBackend};
pub use dispatch::{StatusDispatcher, StatusFunctionResponse, StatusRequest};
pub use error::{ConfigFormatError, ErrorKind, HandlerError, StoreAccessError, ValidationError};
pub use status::{AuthGate, StatusMachine, TransitionCommand};
pub use store::{build_store, FileStatusStore, InMemoryStatusStore, StatusRecord, StatusStore};
pub use telemetry::{create_invocation_span, generate_correlation_id, init_telemetry};
