pub mod composer;
pub mod smtp;
pub mod transport;
