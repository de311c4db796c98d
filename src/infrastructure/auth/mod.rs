pub mod middleware;
pub mod request_id;

pub use middleware::{acting_user_middleware, ActingUser, USER_ID_HEADER};
pub use request_id::{request_id_middleware, RequestId};
