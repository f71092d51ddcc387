pub mod service;

pub use service::SearchService;
