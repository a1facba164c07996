//! CSV decoding into a [`RawTable`](sheetmap_model::RawTable).

mod header;
mod reader;

pub use header::{dedupe_headers, sniff_delimiter};
pub use reader::{
    MAX_CSV_FILE_SIZE, check_file_size, check_file_size_with_limit, decode_bytes, parse_csv_text,
    read_csv_table,
};
