pub mod csv_utils;
