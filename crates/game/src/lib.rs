pub mod catalog;
pub mod inventory;
pub mod level;
pub mod save;
pub mod scene;
pub mod ui;
pub mod world;
