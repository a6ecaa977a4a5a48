pub mod csv_writer;
pub mod errors;
pub mod summary;
