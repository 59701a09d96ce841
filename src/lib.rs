pub mod backend;
pub mod dialog;
pub mod engine;
pub mod limits;
pub mod lookup;
pub mod model;
pub mod notify;
pub mod observability;
pub mod refresher;
