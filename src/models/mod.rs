pub mod booking;
pub mod user;

pub use booking::{Booking, BookingStatus};
pub use user::AuthUser;
