pub mod home;
pub mod profile;
pub mod season;
pub mod user;
