pub mod dealers;
pub mod deliveries;
pub mod drivers;
pub mod error;
pub mod events;
pub mod health;
pub mod messages;
pub mod sales_users;
pub mod unread;

pub use error::AppError;
