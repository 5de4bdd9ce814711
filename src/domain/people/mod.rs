//! People and places: user accounts, enrolled children and training locations.

mod child;
mod location;
mod user;

pub use child::{Child, Gender};
pub use location::Location;
pub use user::{User, UserRole};
