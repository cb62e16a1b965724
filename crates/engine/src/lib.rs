pub mod batch;
pub mod captcha;
pub mod chrome;
pub mod driver;
pub mod events;
pub mod extract;
pub mod job;
pub mod stats;
pub mod store;
pub mod userdata;

#[cfg(test)]
mod testutil;

pub use batch::*;
pub use captcha::*;
pub use chrome::*;
pub use driver::*;
pub use events::*;
pub use extract::*;
pub use job::*;
pub use stats::*;
pub use store::*;
pub use userdata::*;
