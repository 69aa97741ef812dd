//! Repository functions, generic over `ConnectionTrait`.

pub mod users;
