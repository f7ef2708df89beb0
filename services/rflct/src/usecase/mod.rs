pub mod code;
pub mod lockout;
