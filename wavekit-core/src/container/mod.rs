pub mod decode;
pub mod encode;
pub mod riff;
pub mod sidecar;
