pub mod auth;
pub mod error;
pub mod inbox;
pub mod interest;
pub mod leases;
pub mod middleware;
pub mod reviews;
pub mod users;
pub mod view;
