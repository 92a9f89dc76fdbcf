pub mod errors;
pub mod db;
pub mod wallpaper;

#[cfg(test)]
mod tests;
