mod error;
mod http_mapping;
mod traits;
mod types;

pub use error::{RepositoryError, Result};
pub use http_mapping::{
    delivery_error_to_status_code, message_error_to_status_code, repository_error_to_status_code,
};
pub use traits::{
    DealerRepository, DeliveryRepository, DriverRepository, MessageRepository,
    SalesUserRepository,
};
pub use types::{CountResponse, MessageQuery};
