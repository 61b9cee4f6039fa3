pub mod directory_reader;
