pub mod allocator;
pub mod chunk;
