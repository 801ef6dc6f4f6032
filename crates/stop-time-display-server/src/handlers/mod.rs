pub mod health;
pub mod poll;
