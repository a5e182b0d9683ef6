// X Eyes stateful managers

pub mod redirect_guard;
pub mod stats_store;
