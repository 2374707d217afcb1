//! Fixed-size shopping cart quantity map.
//!
//! A cart is a mapping from item slot index (`0..CART_SLOTS`) to a
//! non-negative quantity. Every user owns exactly one cart, created with
//! all slots at zero at registration time. On the wire (and in JSONB
//! storage) the cart is a string-keyed JSON object, e.g.
//! `{"0": 0, "1": 2, ...}`, always carrying all 300 slots.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of item slots in every cart.
pub const CART_SLOTS: usize = 300;

/// Errors from cart slot operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    /// The slot index is outside `0..CART_SLOTS`.
    #[error("cart slot {0} is out of range (0..{CART_SLOTS})")]
    SlotOutOfRange(usize),
}

/// A user's cart: quantity per item slot.
///
/// Quantities have no upper bound; removal floors at zero. Slot indexes
/// outside `0..CART_SLOTS` are rejected rather than silently created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    slots: Vec<u64>,
}

impl Cart {
    /// Create a cart with every slot at zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: vec![0; CART_SLOTS],
        }
    }

    /// Number of slots (always [`CART_SLOTS`]).
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when every slot is zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|&q| q == 0)
    }

    /// Quantity currently in `slot`.
    ///
    /// # Errors
    ///
    /// Returns `CartError::SlotOutOfRange` for slots outside `0..CART_SLOTS`.
    pub fn quantity(&self, slot: usize) -> Result<u64, CartError> {
        self.slots
            .get(slot)
            .copied()
            .ok_or(CartError::SlotOutOfRange(slot))
    }

    /// Add one unit to `slot`. No upper bound is enforced.
    ///
    /// # Errors
    ///
    /// Returns `CartError::SlotOutOfRange` for slots outside `0..CART_SLOTS`.
    pub fn add(&mut self, slot: usize) -> Result<(), CartError> {
        let q = self
            .slots
            .get_mut(slot)
            .ok_or(CartError::SlotOutOfRange(slot))?;
        *q = q.saturating_add(1);
        Ok(())
    }

    /// Remove one unit from `slot`, flooring at zero.
    ///
    /// Removing from an already-empty slot is a no-op, not an error.
    ///
    /// # Errors
    ///
    /// Returns `CartError::SlotOutOfRange` for slots outside `0..CART_SLOTS`.
    pub fn remove(&mut self, slot: usize) -> Result<(), CartError> {
        let q = self
            .slots
            .get_mut(slot)
            .ok_or(CartError::SlotOutOfRange(slot))?;
        *q = q.saturating_sub(1);
        Ok(())
    }

    /// Iterate over `(slot, quantity)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, u64)> + '_ {
        self.slots.iter().copied().enumerate()
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

impl Serialize for Cart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.slots.len()))?;
        for (slot, quantity) in self.iter() {
            map.serialize_entry(&slot.to_string(), &quantity)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Cart {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CartVisitor;

        impl<'de> Visitor<'de> for CartVisitor {
            type Value = Cart;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a map of slot index strings to quantities")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Cart, A::Error> {
                let mut cart = Cart::new();
                while let Some((key, quantity)) = access.next_entry::<String, u64>()? {
                    let slot: usize = key
                        .parse()
                        .map_err(|_| serde::de::Error::custom(format!("invalid cart slot: {key}")))?;
                    let entry = cart
                        .slots
                        .get_mut(slot)
                        .ok_or_else(|| serde::de::Error::custom(CartError::SlotOutOfRange(slot)))?;
                    *entry = quantity;
                }
                Ok(cart)
            }
        }

        deserializer.deserialize_map(CartVisitor)
    }
}
