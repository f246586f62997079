pub mod relay;
pub mod upstream;
