/// logger initialisation based on simplelog
pub mod logger;
