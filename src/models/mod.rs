pub mod notification;
pub mod payment;
pub mod response;

pub use notification::*;
pub use payment::*;
pub use response::*;
