pub mod case;
pub mod entities;
pub mod error;
pub mod handlers;
pub mod response;

pub use handlers::app;
