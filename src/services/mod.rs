pub mod shows;
pub mod seats;
pub mod reservations;

pub use shows::ShowService;
pub use seats::SeatService;
pub use reservations::ReservationService;
