pub mod buf_reader;
