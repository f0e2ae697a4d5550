pub mod aggregation;
pub mod date_window;
pub mod kind;
pub mod lat_lon;
pub mod measurement;
