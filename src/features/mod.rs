pub mod contact;
pub mod health;
pub mod pages;
pub mod primer;
pub mod settings;
