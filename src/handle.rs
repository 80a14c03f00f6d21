//! Opaque, pointer-sized handles used as keys and values.
//!
//! The table stores handles by copy and never dereferences, drops or
//! otherwise manages whatever a handle refers to. Keeping the referent alive
//! for as long as the table may hand the handle back is the caller's job.

use core::num::NonZeroUsize;
use core::ptr::NonNull;

/// A `Copy`, pointer-sized value that can be stored in a
/// [`ChainTable`](crate::ChainTable).
///
/// Every handle type has a single reserved null value, reported by
/// [`is_null`](Handle::is_null). A null key is never stored and never found.
///
/// Implementors must be exactly the size of a `usize`; this is checked at
/// compile time when a table is constructed.
///
/// # Examples
///
/// Newtypes over an existing handle only need to forward [`address`]:
///
/// ```rust
/// use chain_table::Handle;
///
/// #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
/// struct ObjectId(usize);
///
/// impl Handle for ObjectId {
///     fn address(self) -> usize {
///         self.0
///     }
/// }
///
/// assert!(ObjectId(0).is_null());
/// assert!(!ObjectId(0x1000).is_null());
/// ```
///
/// [`address`]: Handle::address
pub trait Handle: Copy {
    /// The raw address (or integer identity) this handle carries.
    fn address(self) -> usize;

    /// Returns `true` for the reserved null handle.
    #[inline]
    fn is_null(self) -> bool {
        self.address() == 0
    }
}

impl<T: ?Sized> Handle for *const T {
    #[inline]
    fn address(self) -> usize {
        self.cast::<()>().addr()
    }
}

impl<T: ?Sized> Handle for *mut T {
    #[inline]
    fn address(self) -> usize {
        self.cast::<()>().addr()
    }
}

impl<T: ?Sized> Handle for NonNull<T> {
    #[inline]
    fn address(self) -> usize {
        self.as_ptr().cast::<()>().addr()
    }
}

impl<T: ?Sized> Handle for Option<NonNull<T>> {
    #[inline]
    fn address(self) -> usize {
        self.map_or(0, Handle::address)
    }
}

impl<T: ?Sized> Handle for &T {
    #[inline]
    fn address(self) -> usize {
        core::ptr::from_ref(self).cast::<()>().addr()
    }
}

impl<T: ?Sized> Handle for Option<&T> {
    #[inline]
    fn address(self) -> usize {
        self.map_or(0, Handle::address)
    }
}

impl Handle for usize {
    #[inline]
    fn address(self) -> usize {
        self
    }
}

impl Handle for NonZeroUsize {
    #[inline]
    fn address(self) -> usize {
        self.get()
    }
}

/// Compile-time check that `H` is exactly pointer-sized.
#[inline(always)]
pub(crate) const fn is_pointer_sized<H>() -> bool {
    size_of::<H>() == size_of::<usize>()
}
