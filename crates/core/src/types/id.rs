//! Row ids for users, products and purchases.
//!
//! Every id is a distinct type over the `INTEGER` identity column of its
//! table, so a `ProductId` cannot be passed where a `UserId` is expected.
//! Ids are assigned by the store that owns the row, never computed by
//! callers.

/// Declare an id type for one table.
///
/// The generated type serializes as a bare JSON number, orders by value
/// (the in-memory tables are `BTreeMap`s keyed by id) and converts to and
/// from `i32` for binding in queries.
///
/// ```rust
/// # use tienda_core::define_id;
/// define_id!(ShelfId);
/// define_id!(AisleId);
///
/// let shelf = ShelfId::new(1);
/// let aisle = AisleId::new(1);
/// assert_eq!(shelf.as_i32(), aisle.as_i32());
/// // let _: ShelfId = aisle; // mismatched types
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Wrap a raw column value.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// Raw value for query binds.
            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(UserId);
define_id!(ProductId);
define_id!(PurchaseId);
