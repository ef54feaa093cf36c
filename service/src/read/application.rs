//! [`Application`] read model definition.

#[cfg(doc)]
use crate::domain::Application;

/// Wrapper around an [`Application`] indicating that it [`is_pending()`].
///
/// [`is_pending()`]: Application::is_pending
#[derive(Clone, Debug)]
pub struct Pending<T>(pub T);
