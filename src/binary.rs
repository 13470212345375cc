/// Read binary data
pub mod read;
