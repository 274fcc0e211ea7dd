//! Pluggable backend seam.
//!
//! A [`DialectorFactory`] turns an opaque DSN into a [`Dialector`], and a
//! dialector knows how to open a [`Connection`] to its engine. Swapping the
//! factory handed to the database facade swaps the backend without touching
//! any facade logic, which is how tests substitute alternate stores.

use crate::Result;
use crate::connection::Connection;

/// A driver-specific connection descriptor.
pub trait Dialector {
    /// The connection type this dialector opens.
    type Connection: Connection;

    /// Short engine name used in logs, e.g. `"sqlite"`.
    fn name(&self) -> &'static str;

    /// The DSN this dialector was created from.
    fn dsn(&self) -> &str;

    /// Open a new connection to the store.
    ///
    /// Fails with `Error::Connection` when the engine cannot open the store.
    fn open(&self) -> Result<Self::Connection>;
}

/// Produces a [`Dialector`] from a DSN.
///
/// `create` must be pure: no I/O and no validation beyond carrying the DSN
/// through. Problems with the DSN surface later from [`Dialector::open`].
pub trait DialectorFactory {
    type Dialector: Dialector;

    fn create(&self, dsn: &str) -> Self::Dialector;
}

impl<F: DialectorFactory + ?Sized> DialectorFactory for &F {
    type Dialector = F::Dialector;

    fn create(&self, dsn: &str) -> Self::Dialector {
        (**self).create(dsn)
    }
}

impl<F: DialectorFactory + ?Sized> DialectorFactory for std::sync::Arc<F> {
    type Dialector = F::Dialector;

    fn create(&self, dsn: &str) -> Self::Dialector {
        (**self).create(dsn)
    }
}
