pub mod raw_reader;
pub mod source;
pub mod table_reader;

pub use raw_reader::RawFileReader;
pub use source::read_utf8;
pub use table_reader::TableReader;
