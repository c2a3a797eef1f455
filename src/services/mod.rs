pub mod bookings;
pub mod store;
pub mod validation;
