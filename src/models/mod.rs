pub mod booking;
pub mod tour;

pub use booking::{Booking, BookingDraft};
pub use tour::{Tour, TourForm};
