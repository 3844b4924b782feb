mod app;
pub mod fetch;

pub use app::App;
