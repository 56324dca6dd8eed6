//! Scheduled systems. The daily pipeline runs once per simulated day, the
//! monthly pipeline once per month boundary; both are chained in order.

mod calendar;
mod diplomacy;
mod economy;
mod events;
mod logging;
mod parliament;
mod projects;
mod situations;
mod social;

pub use calendar::*;
pub use diplomacy::*;
pub use economy::*;
pub use events::*;
pub use logging::*;
pub use parliament::*;
pub use projects::*;
pub use situations::*;
pub use social::*;
