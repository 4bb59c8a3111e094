pub mod hash;
pub mod jwt;
pub mod owner;
pub mod ownership;
