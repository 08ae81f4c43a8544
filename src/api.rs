pub mod activity;
pub mod auth;
pub mod project;
pub mod swagger_main;
pub mod task;
pub mod user;

#[cfg(test)]
pub mod test_util;
