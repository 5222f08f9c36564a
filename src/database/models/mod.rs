pub mod application;
pub mod company;
pub mod connection;
pub mod group;
pub mod job;
pub mod message;
pub mod user;
pub mod vendor;

pub use application::*;
pub use company::*;
pub use connection::*;
pub use group::*;
pub use job::*;
pub use message::*;
pub use user::*;
pub use vendor::*;
