// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Security Level: bearer JWT for an administrative principal
// Route Prefix: /api/*
// Middleware: jwt_auth_middleware (injects AuthUser)
//
// Handlers never write to the store themselves. Every client body is reduced
// to a Record through the entity's FieldPolicy and handed to a service.

pub mod organizations;
pub mod roles;
pub mod users;
pub mod utils;
