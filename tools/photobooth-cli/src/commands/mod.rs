pub mod capture;
pub mod choose;
pub mod delete;
pub mod export;
pub mod info;
pub mod reset;
pub mod review;
mod state;
