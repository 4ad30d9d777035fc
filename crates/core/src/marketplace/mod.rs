mod error;
mod operations;
mod requests;
mod types;

pub use error::{DeliveryError, MessageError};
pub use operations::{
    accept_delivery, count_unread, counterpart_of, filter_deliveries, transition_delivery,
    validate_delivery, validate_message,
};
pub use requests::{
    AcceptDeliveryRequest, CreateDealerRequest, CreateDeliveryRequest, CreateDriverRequest,
    CreateSalesUserRequest, ListDeliveriesQuery, MarkReadRequest, SendMessageRequest,
    UpdateDeliveryRequest, UpdateDriverRequest, UpdateStatusRequest,
};
pub use types::{Dealer, Delivery, DeliveryKind, DeliveryStatus, Driver, Message, SalesUser};
