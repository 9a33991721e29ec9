//! HTTP Facade - RESTful API
//!
//! 引擎之上的薄封装：音色目录查询与整段合成

pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;

pub use server::{HttpServer, ServerConfig};
pub use state::AppState;
