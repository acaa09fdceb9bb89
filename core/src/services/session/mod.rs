//! Session store for login sessions

mod store;

#[cfg(test)]
mod tests;

pub use store::SessionStore;
