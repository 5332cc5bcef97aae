pub mod image;
pub mod owner;
pub mod promotion;
pub mod seller;
pub mod upload_profile;
pub mod user;
