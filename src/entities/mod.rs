pub mod prelude;

pub mod home_content;
pub mod participants;
pub mod seasons;
pub mod user_profiles;
pub mod users;
