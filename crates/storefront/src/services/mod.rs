//! External collaborators and credential services.

pub mod checkout;
pub mod password;
pub mod token;

pub use checkout::{CheckoutError, CheckoutProvider, CheckoutRequest, LineItem, StripeCheckout};
pub use token::{TokenError, TokenService};
