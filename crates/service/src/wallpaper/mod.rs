pub mod domain;
pub mod query;
pub mod tags;
pub mod upload;
pub mod repository;
pub mod repo {
    pub mod seaorm;
}
pub mod catalog;
pub mod fallback;
pub mod service;
