pub mod invitation;
pub mod journey;
pub mod member;
pub mod persona;
pub mod role;
pub mod user;
pub mod workspace;
