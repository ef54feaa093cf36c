//! Domain entities definitions.

pub mod application;
pub mod appointment;
pub mod contract;
pub mod offering;
pub mod session;
pub mod user;

pub use self::{
    application::Application, appointment::Appointment, contract::Contract,
    offering::Offering, session::Session, user::User,
};
