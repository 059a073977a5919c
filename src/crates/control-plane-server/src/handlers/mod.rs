pub mod flows;
pub mod health;
pub mod scenarios;
pub mod sessions;
