//! In-memory [`Database`] implementation.

mod impls;

use std::{collections::HashMap, future::Future, sync::Arc};

use derive_more::{Deref, Display, Error as StdError};
use tokio::sync::{Mutex, MutexGuard, OwnedMutexGuard};

use crate::domain::{
    application, appointment, contract, offering, session, user, Application,
    Appointment, Contract, Offering, Session, User,
};
#[cfg(doc)]
use crate::infra::Database;

/// In-memory [`Database`] client.
///
/// Intended for tests and local runs. Whole transactions are serialized
/// behind a single [`Mutex`] over the [`State`], which provides the same
/// guarantees as row-level locking does.
#[derive(Clone, Copy, Debug, Default, Deref)]
pub struct Memory<C = NonTx>(C);

impl Memory {
    /// Creates a new empty [`Memory`] client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// In-memory database [`Error`].
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// Unique index violation.
    #[display("unique index `{_0}` violation")]
    UniqueViolation(#[error(not(source))] &'static str),
}

impl Error {
    /// Checks if the error is a unique violation of the specified constraint.
    #[must_use]
    pub fn is_unique_violation(&self, constraint: Option<&str>) -> bool {
        match self {
            Self::UniqueViolation(index) => {
                constraint.map_or(true, |c| *index == c)
            }
        }
    }
}

/// Non-transactional [`Memory`] client.
#[derive(Clone, Debug, Default)]
pub struct NonTx(Arc<Mutex<State>>);

/// Transactional [`Memory`] client.
#[derive(Clone, Debug)]
pub struct Tx {
    /// Shared [`State`] this transaction commits into.
    shared: Arc<Mutex<State>>,

    /// Lazily started [`Work`] of this transaction.
    work: Arc<Mutex<Option<Work>>>,
}

/// Started work of a [`Tx`] client.
#[derive(Debug)]
struct Work {
    /// Guard holding the shared [`State`] exclusively until this [`Work`] is
    /// committed or dropped.
    guard: OwnedMutexGuard<State>,

    /// Copy of the [`State`] the operations apply to.
    ///
    /// Replaces the guarded [`State`] on commit, and is discarded otherwise,
    /// rolling this [`Work`] back.
    scratch: State,
}

impl Tx {
    /// Creates a new [`Tx`] client on top of the provided [`NonTx`] one.
    fn from_non_tx(client: &NonTx) -> Self {
        Self {
            shared: Arc::clone(&client.0),
            work: Arc::new(Mutex::new(None)),
        }
    }

    /// Returns the [`Work`] of this [`Tx`] client, starting it if it hasn't
    /// started yet.
    async fn work(&self) -> MutexGuard<'_, Option<Work>> {
        let mut work = self.work.lock().await;
        if work.is_none() {
            let guard = Arc::clone(&self.shared).lock_owned().await;
            let scratch = guard.clone();
            *work = Some(Work { guard, scratch });
        }
        work
    }

    /// Commits this [`Tx`] client.
    async fn commit(&self) {
        // Work never started means there is nothing to commit.
        if let Some(Work { mut guard, scratch }) =
            self.work.lock().await.take()
        {
            *guard = scratch;
        }
    }
}

/// Plain data store of a [`Memory`] database.
#[derive(Clone, Debug, Default)]
pub struct State {
    /// Stored [`User`]s.
    users: HashMap<user::Id, User>,

    /// Stored [`Offering`]s.
    offerings: HashMap<offering::Id, Offering>,

    /// Stored [`Application`]s.
    applications: HashMap<application::Id, Application>,

    /// Stored [`Contract`]s.
    contracts: HashMap<contract::Id, Contract>,

    /// Stored [`Appointment`]s.
    appointments: HashMap<appointment::Id, Appointment>,

    /// Stored [`Session`]s.
    sessions: HashMap<session::Id, Session>,
}

/// Access to the [`State`] viewed by a [`Memory`] client.
pub trait View {
    /// Provides the given closure with read access to the [`State`].
    fn read<R>(&self, f: impl FnOnce(&State) -> R) -> impl Future<Output = R>;

    /// Provides the given closure with write access to the [`State`].
    fn write<R>(
        &self,
        f: impl FnOnce(&mut State) -> R,
    ) -> impl Future<Output = R>;
}

impl View for NonTx {
    async fn read<R>(&self, f: impl FnOnce(&State) -> R) -> R {
        f(&*self.0.lock().await)
    }

    async fn write<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        f(&mut *self.0.lock().await)
    }
}

impl View for Tx {
    async fn read<R>(&self, f: impl FnOnce(&State) -> R) -> R {
        let work = self.work().await;
        f(&work.as_ref().expect("started in `work()`").scratch)
    }

    async fn write<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        let mut work = self.work().await;
        f(&mut work.as_mut().expect("started in `work()`").scratch)
    }
}
