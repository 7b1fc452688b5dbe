pub mod book;
pub mod company;
pub mod sector;
