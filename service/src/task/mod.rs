//! Background [`Task`]s definitions.

mod background;
pub mod reap_unretained_offerings;

pub use common::Handler as Task;

pub use self::{
    background::Background,
    reap_unretained_offerings::ReapUnretainedOfferings,
};
