//! GraphQL API definitions.

pub mod application;
pub mod appointment;
pub mod contract;
mod mutation;
pub mod offering;
mod query;
pub mod scalar;
pub mod session;
mod subscription;
pub mod user;

pub use self::{
    application::Application, appointment::Appointment, contract::Contract,
    mutation::Mutation, offering::Offering, query::Query, session::Session,
    subscription::Subscription, user::User,
};

/// GraphQL schema.
pub type Schema = juniper::RootNode<'static, Query, Mutation, Subscription>;
