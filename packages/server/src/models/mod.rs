pub mod comment;
pub mod photo;
pub mod shared;
pub mod social_media;
pub mod user;
