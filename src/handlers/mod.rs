pub mod badge;
pub mod callback;
pub mod health;
pub mod index;

pub use badge::*;
pub use callback::*;
pub use health::*;
pub use index::*;
