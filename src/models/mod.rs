pub mod user;
pub mod show;
pub mod seat;
pub mod booking;

pub use user::User;
pub use show::Show;
pub use seat::Seat;
pub use booking::Booking;
