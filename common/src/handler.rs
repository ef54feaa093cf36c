//! [`Handler`] abstractions.

use std::future::Future;

/// Executable handler.
///
/// `Args` describe the operation to perform, while the implementor provides
/// the environment it's performed in.
pub trait Handler<Args = ()> {
    /// Type of successful [`Handler`] result.
    type Ok;

    /// Type of this [`Handler`] error.
    type Err;

    /// Executes this [`Handler`] with the provided arguments.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}
