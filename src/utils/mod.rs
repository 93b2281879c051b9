//! Utilidades del sistema
//!
//! Este módulo contiene utilidades para manejo de errores,
//! JWT y otras funcionalidades comunes.

pub mod errors;
pub mod jwt;
