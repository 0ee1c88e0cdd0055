pub mod dealer;
pub mod property;
