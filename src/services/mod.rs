// X Eyes services

pub mod navigation_interceptor;
pub mod settings_engine;
pub mod stats_tracker;
pub mod url_matcher;
