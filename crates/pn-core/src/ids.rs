use core::fmt;
use core::num::NonZeroU32;

/// Defines a compact, stable slot identifier.
///
/// - `u32` keeps memory small
/// - `NonZero` enables `Option<Id>` to be pointer-optimized
/// - separate types keep node and edge slots from being mixed up
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(NonZeroU32);

        impl $name {
            /// Create an id from a 0-based slot index by storing index+1.
            pub fn from_index(index: u32) -> Self {
                Self(NonZeroU32::MIN.saturating_add(index))
            }

            /// Recover the 0-based slot index.
            pub fn index(self) -> u32 {
                self.0.get() - 1
            }

            /// Slot index as `usize`, for addressing slot vectors.
            pub fn slot(self) -> usize {
                self.index() as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.index())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.index())
            }
        }
    };
}

define_id!(
    /// Identifier of a junction slot.
    NodeId,
    "n"
);

define_id!(
    /// Identifier of a connector slot. Never reused after removal.
    EdgeId,
    "e"
);
