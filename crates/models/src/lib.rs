pub mod errors;
pub mod db;
pub mod role;
pub mod user;
pub mod user_credentials;
pub mod user_role;

#[cfg(test)]
mod tests;
