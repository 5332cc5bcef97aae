pub mod login;
pub mod media;
pub mod promotions;
pub mod sellers;
pub mod upload_profiles;
pub mod users;
