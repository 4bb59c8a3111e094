pub mod comment;
pub mod photo;
pub mod social_media;
pub mod user;
