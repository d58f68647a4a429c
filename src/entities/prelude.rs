pub use super::home_content::Entity as HomeContent;
pub use super::participants::Entity as Participants;
pub use super::seasons::Entity as Seasons;
pub use super::user_profiles::Entity as UserProfiles;
pub use super::users::Entity as Users;
