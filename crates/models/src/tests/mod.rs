
/// Wallpaper entity CRUD and counter tests
pub mod wallpaper_tests;
