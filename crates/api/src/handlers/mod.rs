pub mod character;
pub mod post;
