pub mod badge;
pub mod clock;
pub mod processor;
pub mod store;
pub mod verifier;

pub use badge::{needs_compat_mode, render_badge};
pub use clock::{Clock, ManualClock, SystemClock};
pub use processor::{CallbackOutcome, EventProcessor};
pub use store::{MemoryStore, RecordStore, RedisStore};
pub use verifier::{HttpVerifier, Verifier};
