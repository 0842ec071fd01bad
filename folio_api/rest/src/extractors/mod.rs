pub mod admin_secret;
