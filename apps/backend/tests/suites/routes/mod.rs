mod files;
mod health;
mod root;
mod users;
