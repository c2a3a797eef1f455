pub mod bookings;
pub mod health;
pub mod session;
pub mod validate;
